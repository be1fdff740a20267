// src/noyau/jetons.rs

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use super::erreurs::ErreurSyntaxe;

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    // Littéral entier exact (décimal ou 0x…), converti en f64 au parse
    Entier(BigInt),
    Reel(f64),

    // Fonctions, paramètres, constantes (normalisés en minuscules)
    Ident(String),

    Plus,
    Moins,
    Etoile,
    Slash,
    Pourcent,
    Chapeau, // ^ ou **

    Et,  // & / and
    Ou,  // | / or
    Xou, // xor
    Non, // ~ ! / not
    Shl, // <<
    Shr, // >>

    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    LPar,
    RPar,
    Virgule,
    Egal, // définition de fonction
}

impl Tok {
    /// Valeur numérique d’un littéral (None pour les autres jetons).
    pub fn valeur(&self) -> Option<f64> {
        match self {
            Tok::Entier(n) => Some(n.to_f64().unwrap_or(f64::INFINITY)),
            Tok::Reel(x) => Some(*x),
            _ => None,
        }
    }
}

/// Jeton + position (index de caractère) pour les messages d’erreur.
#[derive(Clone, Debug, PartialEq)]
pub struct Jeton {
    pub tok: Tok,
    pub pos: usize,
}

/// Tokenize une ligne en jetons.
/// Supporte:
/// - entiers (12), hexadécimaux (0x1F), réels (1.5, .5, 2., 1e3, 2.5e-3)
/// - identifiants [a-z_][a-z0-9_]* (normalisés en minuscules)
/// - mots-clés and / or / xor / not
/// - opérateurs + - * / % ^ ** & | ~ ! << >> == != < <= > >=
/// - ( ) , =
pub fn tokenize(s: &str) -> Result<Vec<Jeton>, ErreurSyntaxe> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];
        let pos = i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let suivant = chars.get(i + 1).copied();

        // Opérateurs sur deux caractères d’abord
        let double = match (c, suivant) {
            ('*', Some('*')) => Some(Tok::Chapeau),
            ('<', Some('<')) => Some(Tok::Shl),
            ('>', Some('>')) => Some(Tok::Shr),
            ('<', Some('=')) => Some(Tok::Le),
            ('>', Some('=')) => Some(Tok::Ge),
            ('=', Some('=')) => Some(Tok::Eq),
            ('!', Some('=')) => Some(Tok::Ne),
            _ => None,
        };
        if let Some(tok) = double {
            out.push(Jeton { tok, pos });
            i += 2;
            continue;
        }

        let simple = match c {
            '+' => Some(Tok::Plus),
            '-' => Some(Tok::Moins),
            '*' => Some(Tok::Etoile),
            '/' => Some(Tok::Slash),
            '%' => Some(Tok::Pourcent),
            '^' => Some(Tok::Chapeau),
            '&' => Some(Tok::Et),
            '|' => Some(Tok::Ou),
            '~' | '!' => Some(Tok::Non),
            '<' => Some(Tok::Lt),
            '>' => Some(Tok::Gt),
            '=' => Some(Tok::Egal),
            '(' => Some(Tok::LPar),
            ')' => Some(Tok::RPar),
            ',' => Some(Tok::Virgule),
            _ => None,
        };
        if let Some(tok) = simple {
            out.push(Jeton { tok, pos });
            i += 1;
            continue;
        }

        // Identifiants ASCII : [a-zA-Z_][a-zA-Z0-9_]*
        if c.is_ascii_alphabetic() || c == '_' {
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[pos..i].iter().collect();
            let tok = match word.to_lowercase().as_str() {
                "and" => Tok::Et,
                "or" => Tok::Ou,
                "xor" => Tok::Xou,
                "not" => Tok::Non,
                w => Tok::Ident(w.to_string()),
            };
            out.push(Jeton { tok, pos });
            continue;
        }

        // Nombres
        if c.is_ascii_digit() || (c == '.' && suivant.is_some_and(|d| d.is_ascii_digit())) {
            let (tok, fin) = lire_nombre(&chars, pos)?;
            out.push(Jeton { tok, pos });
            i = fin;
            continue;
        }

        return Err(ErreurSyntaxe::Caractere { pos, c });
    }

    Ok(out)
}

/// Lit un littéral numérique à partir de `debut`.
/// Retourne le jeton et l’index juste après le littéral.
fn lire_nombre(chars: &[char], debut: usize) -> Result<(Tok, usize), ErreurSyntaxe> {
    let mut i = debut;

    // Hexadécimal : 0x…
    if chars[i] == '0' && matches!(chars.get(i + 1), Some('x') | Some('X')) {
        i += 2;
        let start = i;
        while i < chars.len() && chars[i].is_ascii_hexdigit() {
            i += 1;
        }
        if start == i {
            return Err(ErreurSyntaxe::Nombre { pos: debut });
        }
        let hex: String = chars[start..i].iter().collect();
        let n = BigInt::parse_bytes(hex.as_bytes(), 16)
            .ok_or(ErreurSyntaxe::Nombre { pos: debut })?;
        return Ok((Tok::Entier(n), i));
    }

    let mut reel = false;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        reel = true;
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        reel = true;
        i += 1;
        if i < chars.len() && (chars[i] == '+' || chars[i] == '-') {
            i += 1;
        }
        let start_exp = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        if start_exp == i {
            return Err(ErreurSyntaxe::Nombre { pos: debut });
        }
    }

    // un littéral collé à un identifiant (ex: 12ab) n’est pas un nombre
    if i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.')
    {
        return Err(ErreurSyntaxe::Nombre { pos: debut });
    }

    let texte: String = chars[debut..i].iter().collect();
    if !reel {
        let n = BigInt::parse_bytes(texte.as_bytes(), 10)
            .ok_or(ErreurSyntaxe::Nombre { pos: debut })?;
        return Ok((Tok::Entier(n), i));
    }

    // ".5" -> "0.5", "2." -> "2.0" (forme acceptée partout)
    let mut norm = texte;
    if norm.starts_with('.') {
        norm.insert(0, '0');
    }
    if let Some(p) = norm.find('.') {
        if !norm[p + 1..].starts_with(|d: char| d.is_ascii_digit()) {
            norm.insert(p + 1, '0');
        }
    }
    let x = norm
        .parse::<f64>()
        .map_err(|_| ErreurSyntaxe::Nombre { pos: debut })?;
    Ok((Tok::Reel(x), i))
}

/// Format utilitaire (journal) : liste de jetons en texte.
pub fn format_tokens(jetons: &[Jeton]) -> String {
    let mut out = Vec::new();
    for j in jetons {
        let s = match &j.tok {
            Tok::Entier(n) => format!("{n}"),
            Tok::Reel(x) => format!("{x}"),
            Tok::Ident(name) => name.clone(),

            Tok::Plus => "+".to_string(),
            Tok::Moins => "-".to_string(),
            Tok::Etoile => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::Pourcent => "%".to_string(),
            Tok::Chapeau => "^".to_string(),

            Tok::Et => "and".to_string(),
            Tok::Ou => "or".to_string(),
            Tok::Xou => "xor".to_string(),
            Tok::Non => "not".to_string(),
            Tok::Shl => "<<".to_string(),
            Tok::Shr => ">>".to_string(),

            Tok::Eq => "==".to_string(),
            Tok::Ne => "!=".to_string(),
            Tok::Lt => "<".to_string(),
            Tok::Le => "<=".to_string(),
            Tok::Gt => ">".to_string(),
            Tok::Ge => ">=".to_string(),

            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
            Tok::Virgule => ",".to_string(),
            Tok::Egal => "=".to_string(),
        };
        out.push(s);
    }
    out.join(" ")
}
