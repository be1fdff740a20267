//! Noyau — traitement d’une ligne saisie
//!
//! Une ligne (sans l’invite "> ") devient :
//! - une commande d’interface (exit / clear / help), ou
//! - un calcul : écho, définition ou évaluation, puis mise en forme.
//!
//! Le texte d’un calcul se termine TOUJOURS par "\n> " (nouvelle invite).
//! La session possède la table des fonctions : aucun état global.

use log::debug;

use super::erreurs::ErreurEval;
use super::eval::{evaluer, NATIVES};
use super::expr::Ligne;
use super::format::{format_resultat, ModeSortie, PRECISION_MAX};
use super::jetons::{format_tokens, tokenize};
use super::rpn::parse_ligne;
use super::table::TableFonctions;

/// Précision d’affichage au démarrage (décimales).
pub const PRECISION_DEFAUT: usize = 5;

/// Invite ajoutée en fin de chaque réponse.
pub const INVITE: &str = "> ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Statut {
    FonctionDefinie,
    NumeriqueOk,
    ErreurSyntaxe,
    DivisionParZero,
    BooleenTropGrand,
    FonctionInconnue,
    AriteIncorrecte,
    RecursionTropProfonde,
    ErreurFormat,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reponse {
    pub statut: Statut,
    /// Écho + diagnostic ou résultat + invite.
    pub texte: String,
    /// true si la réponse contient une ligne "  = …" (colorée par la vue).
    pub ligne_resultat: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Commande {
    Rien,
    Quitter,
    Effacer,
    Aide(String),
    Calcul(Reponse),
}

#[derive(Clone, Debug)]
pub struct Session {
    table: TableFonctions,
    precision: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PRECISION_DEFAUT)
    }
}

impl Session {
    pub fn new(precision: usize) -> Self {
        Self {
            table: TableFonctions::new(),
            precision: precision.min(PRECISION_MAX),
        }
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// API publique : une ligne saisie -> commande pour l’interface.
    pub fn traiter_ligne(&mut self, ligne: &str) -> Commande {
        let ligne = ligne.trim_end_matches(['\r', '\n']);

        match ligne.trim() {
            "" => Commande::Rien,
            "exit" => Commande::Quitter,
            "clear" => Commande::Effacer,
            "help" => Commande::Aide(self.aide()),
            _ => Commande::Calcul(self.calculer(ligne)),
        }
    }

    /// Écho, puis définition ou calcul. Ne panique jamais.
    pub fn calculer(&mut self, ligne: &str) -> Reponse {
        let echo = format!("  {ligne}\n");

        let mut entree = ligne.trim().to_lowercase();
        let mut mode = ModeSortie::Defaut;
        if entree.starts_with("hex(") {
            entree.drain(..3);
            mode = ModeSortie::Hex;
        } else if entree.starts_with("bin(") {
            entree.drain(..3);
            mode = ModeSortie::Bin;
        }

        let (statut, message) = self.executer(&entree, mode);
        let ligne_resultat = statut == Statut::NumeriqueOk;

        Reponse {
            statut,
            texte: format!("{echo}{message}\n{INVITE}"),
            ligne_resultat,
        }
    }

    fn executer(&mut self, entree: &str, mode: ModeSortie) -> (Statut, String) {
        let ligne = match tokenize(entree).and_then(|jetons| {
            debug!("jetons : {}", format_tokens(&jetons));
            parse_ligne(&jetons)
        }) {
            Ok(l) => l,
            Err(e) => {
                debug!("erreur de syntaxe : {e}");
                return (Statut::ErreurSyntaxe, "  * Parsing Error!".to_string());
            }
        };

        let expr = match ligne {
            Ligne::Definition(def) => {
                debug!("définition : {def}");
                if self.table.definir(def) {
                    debug!("définition remplacée");
                }
                return (Statut::FonctionDefinie, "  * Results in function!".to_string());
            }
            Ligne::Valeur(expr) => expr,
        };

        let v = match evaluer(&expr, &self.table) {
            Ok(v) => v,
            Err(e) => {
                debug!("erreur d’évaluation : {e}");
                return diagnostic(e);
            }
        };

        match format_resultat(v, mode, self.precision) {
            Ok(s) => (Statut::NumeriqueOk, format!("  = {s}")),
            Err(e) => (Statut::ErreurFormat, format!("  * {e}")),
        }
    }

    /// Texte d’aide (se termine par l’invite, comme un calcul).
    pub fn aide(&self) -> String {
        let mut s = String::new();
        s.push_str("  Operators : + - * / % ^ ** << >> == != < <= > >= and or xor not\n");
        s.push_str(&format!("  Functions : {}\n", NATIVES.join(" ")));
        s.push_str("  Constants : pi e\n");
        s.push_str("  Define    : name(a, b) = expression\n");
        s.push_str("  Output    : hex(expression) bin(expression)\n");
        s.push_str("  Commands  : exit clear help\n");

        if self.table.is_empty() {
            s.push_str("  User      : (none)\n");
        } else {
            for def in self.table.definitions() {
                s.push_str(&format!("  User      : {def}\n"));
            }
        }
        s.push_str(INVITE);
        s
    }
}

fn diagnostic(e: ErreurEval) -> (Statut, String) {
    match e {
        ErreurEval::DivisionParZero => (Statut::DivisionParZero, "  * Division by zero!".into()),
        ErreurEval::BooleenTropGrand => (
            Statut::BooleenTropGrand,
            "  * Boolean operator too large!".into(),
        ),
        ErreurEval::FonctionInconnue(nom) => (
            Statut::FonctionInconnue,
            format!("  * Unknown function '{nom}'!"),
        ),
        ErreurEval::AriteIncorrecte { nom, attendu, .. } => (
            Statut::AriteIncorrecte,
            format!("  * Function '{nom}' expects {attendu} argument(s)!"),
        ),
        ErreurEval::RecursionTropProfonde => (
            Statut::RecursionTropProfonde,
            "  * Recursion too deep!".into(),
        ),
        // paramètre libre ou arbre mal formé : refusés au parse normalement
        ErreurEval::IdentInconnu(_) | ErreurEval::Incoherente => {
            (Statut::ErreurSyntaxe, "  * Parsing Error!".into())
        }
    }
}
