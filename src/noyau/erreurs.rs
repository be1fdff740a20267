// src/noyau/erreurs.rs
//
// Erreurs typées du noyau.
// - ErreurSyntaxe : jetons / parse (position = index de caractère dans la ligne)
// - ErreurEval    : exécution de l’arbre
// - ErreurFormat  : sortie binaire impossible (texte affiché tel quel)

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ErreurSyntaxe {
    #[error("caractère inattendu '{c}' (position {pos})")]
    Caractere { pos: usize, c: char },

    #[error("nombre mal formé (position {pos})")]
    Nombre { pos: usize },

    #[error("jeton inattendu (position {pos})")]
    JetonInattendu { pos: usize },

    #[error("parenthèse non fermée (position {pos})")]
    ParentheseOuvrante { pos: usize },

    #[error("parenthèse fermante sans ouvrante (position {pos})")]
    ParentheseFermante { pos: usize },

    #[error("identifiant inconnu '{nom}' (position {pos})")]
    IdentInconnu { pos: usize, nom: String },

    #[error("paramètre '{nom}' répété dans la définition")]
    ParametreDuplique { nom: String },

    #[error("expression trop longue ({n} jetons)")]
    TropLong { n: usize },

    #[error("imbrication trop profonde (position {pos})")]
    TropProfond { pos: usize },

    #[error("expression incohérente")]
    Incoherente,

    #[error("entrée vide")]
    Vide,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ErreurEval {
    #[error("division par zéro")]
    DivisionParZero,

    #[error("opérande booléen hors de l’intervalle 32 bits")]
    BooleenTropGrand,

    #[error("fonction inconnue '{0}'")]
    FonctionInconnue(String),

    #[error("la fonction '{nom}' attend {attendu} argument(s), reçu {recu}")]
    AriteIncorrecte {
        nom: String,
        attendu: usize,
        recu: usize,
    },

    #[error("identifiant inconnu '{0}'")]
    IdentInconnu(String),

    #[error("récursion trop profonde")]
    RecursionTropProfonde,

    #[error("arbre incohérent")]
    Incoherente,
}

/// Erreurs de la sortie binaire : le texte est celui montré à l’utilisateur.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ErreurFormat {
    #[error("Binary output only supported for integers!")]
    PasEntier,

    #[error("Result too large for binary output!")]
    TropGrand,
}
