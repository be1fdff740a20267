//! Noyau — évaluation de l’arbre
//!
//! Parcours post-ordre en f64, SANS récursion sur l’arbre : une pile de tâches
//! et une pile de valeurs (une somme de 2000 termes ne coûte aucun cadre).
//! Seul l’appel d’une fonction utilisateur ré-entre (corps évalué dans son
//! propre cadre), borné par `APPELS_MAX`.
//!
//! Les appels sont résolus dans la table AU MOMENT de l’évaluation (jamais de
//! copie figée à la définition), d’abord parmi les fonctions utilisateur, puis
//! parmi les fonctions natives.
//!
//! Erreurs : division/modulo par zéro, opérande booléen hors 32 bits,
//! fonction inconnue, nombre d’arguments incorrect, récursion trop profonde.
//! La table n’est jamais modifiée ici.

use log::trace;

use super::erreurs::ErreurEval;
use super::expr::{constante, Expr, OpBinaire, OpUnaire};
use super::table::TableFonctions;

/// Garde-fou : imbrication des appels de fonctions utilisateur.
pub const APPELS_MAX: usize = 512;

/// Fonctions natives (noms réservés en lecture : une définition utilisateur les masque).
pub const NATIVES: &[&str] = &[
    "sin", "cos", "tan", "asin", "acos", "atan", "sinh", "cosh", "tanh", "sqrt", "exp", "ln",
    "log", "abs", "int", "round", "floor", "ceil", "min", "max",
];

#[derive(Clone, Copy)]
enum Native {
    Une(fn(f64) -> f64),
    Deux(fn(f64, f64) -> f64),
}

fn native(nom: &str) -> Option<Native> {
    use Native::*;
    let n = match nom {
        "sin" => Une(f64::sin),
        "cos" => Une(f64::cos),
        "tan" => Une(f64::tan),
        "asin" => Une(f64::asin),
        "acos" => Une(f64::acos),
        "atan" => Une(f64::atan),
        "sinh" => Une(f64::sinh),
        "cosh" => Une(f64::cosh),
        "tanh" => Une(f64::tanh),
        "sqrt" => Une(f64::sqrt),
        "exp" => Une(f64::exp),
        "ln" => Une(f64::ln),
        "log" => Une(f64::log10),
        "abs" => Une(f64::abs),
        "int" => Une(f64::trunc),
        "round" => Une(f64::round),
        "floor" => Une(f64::floor),
        "ceil" => Une(f64::ceil),
        "min" => Deux(f64::min),
        "max" => Deux(f64::max),
        _ => return None,
    };
    Some(n)
}

/// Paramètres liés pendant l’évaluation d’un corps de fonction.
#[derive(Clone, Copy)]
struct Cadre<'a> {
    noms: &'a [String],
    valeurs: &'a [f64],
}

const CADRE_VIDE: Cadre<'static> = Cadre {
    noms: &[],
    valeurs: &[],
};

impl Cadre<'_> {
    fn valeur(&self, nom: &str) -> Option<f64> {
        self.noms
            .iter()
            .position(|n| n == nom)
            .and_then(|i| self.valeurs.get(i).copied())
    }
}

/// Travail restant : visiter un nœud, ou appliquer un opérateur à des valeurs déjà empilées.
enum Tache<'e> {
    Visiter(&'e Expr),
    Unaire(OpUnaire),
    Binaire(OpBinaire),
    Appel(&'e str, usize),
}

/// API publique : évalue une expression de valeur avec la table courante.
pub fn evaluer(expr: &Expr, table: &TableFonctions) -> Result<f64, ErreurEval> {
    let v = eval_corps(expr, table, CADRE_VIDE, 0)?;
    trace!("évaluation => {v}");
    Ok(v)
}

/// Évalue un arbre dans un cadre ; `appels` = appels utilisateur en cours.
fn eval_corps(
    expr: &Expr,
    table: &TableFonctions,
    cadre: Cadre<'_>,
    appels: usize,
) -> Result<f64, ErreurEval> {
    let mut taches = vec![Tache::Visiter(expr)];
    let mut pile: Vec<f64> = Vec::new();

    while let Some(tache) = taches.pop() {
        match tache {
            Tache::Visiter(e) => match e {
                Expr::Lit(v) => pile.push(*v),

                Expr::Var(nom) => {
                    let v = cadre
                        .valeur(nom)
                        .or_else(|| constante(nom))
                        .ok_or_else(|| ErreurEval::IdentInconnu(nom.clone()))?;
                    pile.push(v);
                }

                Expr::Unaire(op, x) => {
                    taches.push(Tache::Unaire(*op));
                    taches.push(Tache::Visiter(x));
                }

                // gauche évaluée d’abord : elle est dépilée en premier
                Expr::Binaire(op, a, b) => {
                    taches.push(Tache::Binaire(*op));
                    taches.push(Tache::Visiter(b));
                    taches.push(Tache::Visiter(a));
                }

                Expr::Appel(nom, args) => {
                    taches.push(Tache::Appel(nom, args.len()));
                    taches.extend(args.iter().rev().map(Tache::Visiter));
                }
            },

            Tache::Unaire(op) => {
                let v = depiler(&mut pile)?;
                pile.push(match op {
                    OpUnaire::Neg => -v,
                    OpUnaire::Non => f64::from(!vers_i32(v)?),
                });
            }

            Tache::Binaire(op) => {
                let b = depiler(&mut pile)?;
                let a = depiler(&mut pile)?;
                pile.push(appliquer(op, a, b)?);
            }

            Tache::Appel(nom, n) => {
                let debut = pile.len().checked_sub(n).ok_or(ErreurEval::Incoherente)?;
                let args = pile.split_off(debut);
                pile.push(appeler(nom, &args, table, appels)?);
            }
        }
    }

    match pile.as_slice() {
        [v] => Ok(*v),
        _ => Err(ErreurEval::Incoherente),
    }
}

fn depiler(pile: &mut Vec<f64>) -> Result<f64, ErreurEval> {
    pile.pop().ok_or(ErreurEval::Incoherente)
}

/// Fonction utilisateur d’abord (nouveau cadre), native sinon.
fn appeler(
    nom: &str,
    args: &[f64],
    table: &TableFonctions,
    appels: usize,
) -> Result<f64, ErreurEval> {
    if let Some(def) = table.chercher(nom) {
        if def.params.len() != args.len() {
            return Err(ErreurEval::AriteIncorrecte {
                nom: nom.to_string(),
                attendu: def.params.len(),
                recu: args.len(),
            });
        }
        if appels >= APPELS_MAX {
            return Err(ErreurEval::RecursionTropProfonde);
        }
        let local = Cadre {
            noms: &def.params,
            valeurs: args,
        };
        return eval_corps(&def.corps, table, local, appels + 1);
    }

    match (native(nom), args) {
        (Some(Native::Une(f)), [x]) => Ok(f(*x)),
        (Some(Native::Deux(f)), [x, y]) => Ok(f(*x, *y)),
        (Some(n), _) => Err(ErreurEval::AriteIncorrecte {
            nom: nom.to_string(),
            attendu: match n {
                Native::Une(_) => 1,
                Native::Deux(_) => 2,
            },
            recu: args.len(),
        }),
        (None, _) => Err(ErreurEval::FonctionInconnue(nom.to_string())),
    }
}

fn booleen(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Troncature 32 bits signée ; hors intervalle (ou NaN/inf) => erreur, jamais de repli.
fn vers_i32(v: f64) -> Result<i32, ErreurEval> {
    let t = v.trunc();
    if t >= f64::from(i32::MIN) && t <= f64::from(i32::MAX) {
        Ok(t as i32)
    } else {
        Err(ErreurEval::BooleenTropGrand)
    }
}

fn decalage(v: f64) -> Result<u32, ErreurEval> {
    let n = vers_i32(v)?;
    u32::try_from(n)
        .ok()
        .filter(|n| *n < 32)
        .ok_or(ErreurEval::BooleenTropGrand)
}

fn appliquer(op: OpBinaire, a: f64, b: f64) -> Result<f64, ErreurEval> {
    use OpBinaire::*;

    let v = match op {
        Add => a + b,
        Sub => a - b,
        Mul => a * b,
        Div | Mod if b == 0.0 => return Err(ErreurEval::DivisionParZero),
        Div => a / b,
        Mod => a % b,
        Pow => a.powf(b),

        Eq => booleen(a == b),
        Ne => booleen(a != b),
        Lt => booleen(a < b),
        Le => booleen(a <= b),
        Gt => booleen(a > b),
        Ge => booleen(a >= b),

        Et => f64::from(vers_i32(a)? & vers_i32(b)?),
        Ou => f64::from(vers_i32(a)? | vers_i32(b)?),
        Xou => f64::from(vers_i32(a)? ^ vers_i32(b)?),
        Shl => f64::from(vers_i32(a)? << decalage(b)?),
        Shr => f64::from(vers_i32(a)? >> decalage(b)?),
    };
    Ok(v)
}
