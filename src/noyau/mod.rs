//! Noyau PeaCalc
//!
//! Organisation interne :
//! - erreurs.rs  : erreurs typées (syntaxe, évaluation, sortie)
//! - jetons.rs   : tokenisation (entiers exacts, hex, mots-clés booléens)
//! - expr.rs     : AST f64 + définitions de fonctions
//! - rpn.rs      : shunting-yard + construction Expr (sans récursion)
//! - table.rs    : fonctions utilisateur de la session
//! - eval.rs     : évaluation (natives, appels, garde-fou de profondeur)
//! - format.rs   : affichage décimal / hexadécimal / binaire
//! - commande.rs : une ligne saisie -> commande ou réponse texte

pub mod commande;
pub mod erreurs;
pub mod eval;
pub mod expr;
pub mod format;
pub mod jetons;
pub mod rpn;
pub mod table;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use commande::{Commande, Session};
