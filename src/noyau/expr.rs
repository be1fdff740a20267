// src/noyau/expr.rs
//
// AST (un seul type numérique : f64).
// - Lit    : littéral
// - Var    : paramètre de fonction ou constante (pi, e)
// - Unaire : moins / not
// - Binaire
// - Appel  : résolu par nom dans la table AU MOMENT de l’évaluation
//
// Pas de cycle possible : un appel ne contient que le nom de la fonction.

use std::f64::consts::{E, PI};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpUnaire {
    Neg,
    Non,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpBinaire {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    Shl,
    Shr,

    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    Et,
    Xou,
    Ou,
}

impl OpBinaire {
    /// Mots-clés (and, xor, or) ?
    pub fn est_mot(self) -> bool {
        matches!(self, OpBinaire::Et | OpBinaire::Xou | OpBinaire::Ou)
    }

    pub fn symbole(self) -> &'static str {
        match self {
            OpBinaire::Add => "+",
            OpBinaire::Sub => "-",
            OpBinaire::Mul => "*",
            OpBinaire::Div => "/",
            OpBinaire::Mod => "%",
            OpBinaire::Pow => "^",
            OpBinaire::Shl => "<<",
            OpBinaire::Shr => ">>",
            OpBinaire::Eq => "==",
            OpBinaire::Ne => "!=",
            OpBinaire::Lt => "<",
            OpBinaire::Le => "<=",
            OpBinaire::Gt => ">",
            OpBinaire::Ge => ">=",
            OpBinaire::Et => "and",
            OpBinaire::Xou => "xor",
            OpBinaire::Ou => "or",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Lit(f64),
    Var(String),
    Unaire(OpUnaire, Box<Expr>),
    Binaire(OpBinaire, Box<Expr>, Box<Expr>),
    Appel(String, Vec<Expr>),
}

/// Fonction utilisateur : nom (minuscules), paramètres ordonnés, corps.
#[derive(Clone, Debug, PartialEq)]
pub struct Definition {
    pub nom: String,
    pub params: Vec<String>,
    pub corps: Expr,
}

/// Résultat du parse d’une ligne.
#[derive(Clone, Debug, PartialEq)]
pub enum Ligne {
    Definition(Definition),
    Valeur(Expr),
}

/// Constantes nommées reconnues partout où une valeur est attendue.
pub fn constante(nom: &str) -> Option<f64> {
    match nom {
        "pi" => Some(PI),
        "e" => Some(E),
        _ => None,
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Lit(v) => write!(f, "{v}"),
            Expr::Var(nom) => write!(f, "{nom}"),
            Expr::Unaire(OpUnaire::Neg, x) => write!(f, "-{x}"),
            Expr::Unaire(OpUnaire::Non, x) => write!(f, "not {x}"),
            Expr::Binaire(op, a, b) if op.est_mot() => write!(f, "({a} {} {b})", op.symbole()),
            Expr::Binaire(op, a, b) => write!(f, "({a}{}{b})", op.symbole()),
            Expr::Appel(nom, args) => {
                write!(f, "{nom}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) = {}", self.nom, self.params.join(", "), self.corps)
    }
}
