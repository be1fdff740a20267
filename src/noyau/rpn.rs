// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> AST
// Objectif:
// - Convertir une suite de jetons en RPN (postfix), sans récursion
// - Puis reconstruire Expr avec une pile
//
// Règles:
// - Ident suivi de '(' => appel de fonction (résolu à l’évaluation, pas ici)
// - Ident seul => paramètre lié ou constante, sinon erreur
// - Moins / not en position de valeur => opérateur unaire (lie le plus fort)
// - `nom(p1, p2, …) = corps` en tête de ligne => définition

use log::trace;

use super::erreurs::ErreurSyntaxe;
use super::expr::{constante, Definition, Expr, Ligne, OpBinaire, OpUnaire};
use super::jetons::{Jeton, Tok};

/// Garde-fou : imbrication de parenthèses (appels compris).
pub const PROFONDEUR_MAX: usize = 256;

/// Garde-fou : longueur d’une ligne en jetons.
pub const JETONS_MAX: usize = 4096;

/// Élément de la notation postfixée.
#[derive(Clone, Debug, PartialEq)]
pub enum Rpn {
    Lit(f64),
    Var(String),
    Unaire(OpUnaire),
    Binaire(OpBinaire),
    Appel(String, usize),
}

enum Pile {
    Par {
        pos: usize,
        appel: Option<String>,
        virgules: usize,
    },
    Unaire(OpUnaire),
    Binaire(OpBinaire),
}

const PRIO_UNAIRE: u8 = 9;

fn precedence(op: OpBinaire) -> u8 {
    use OpBinaire::*;
    match op {
        Ou => 1,
        Xou => 2,
        Et => 3,
        Eq | Ne | Lt | Le | Gt | Ge => 4,
        Shl | Shr => 5,
        Add | Sub => 6,
        Mul | Div | Mod => 7,
        Pow => 8,
    }
}

fn is_right_associative(op: OpBinaire) -> bool {
    matches!(op, OpBinaire::Pow)
}

fn op_binaire(t: &Tok) -> Option<OpBinaire> {
    let op = match t {
        Tok::Plus => OpBinaire::Add,
        Tok::Moins => OpBinaire::Sub,
        Tok::Etoile => OpBinaire::Mul,
        Tok::Slash => OpBinaire::Div,
        Tok::Pourcent => OpBinaire::Mod,
        Tok::Chapeau => OpBinaire::Pow,
        Tok::Shl => OpBinaire::Shl,
        Tok::Shr => OpBinaire::Shr,
        Tok::Eq => OpBinaire::Eq,
        Tok::Ne => OpBinaire::Ne,
        Tok::Lt => OpBinaire::Lt,
        Tok::Le => OpBinaire::Le,
        Tok::Gt => OpBinaire::Gt,
        Tok::Ge => OpBinaire::Ge,
        Tok::Et => OpBinaire::Et,
        Tok::Xou => OpBinaire::Xou,
        Tok::Ou => OpBinaire::Ou,
        _ => return None,
    };
    Some(op)
}

/// Sort le sommet de la pile d’opérateurs vers la sortie (parenthèse ignorée).
fn depiler(ops: &mut Vec<Pile>, out: &mut Vec<Rpn>) {
    match ops.pop() {
        Some(Pile::Unaire(op)) => out.push(Rpn::Unaire(op)),
        Some(Pile::Binaire(op)) => out.push(Rpn::Binaire(op)),
        Some(Pile::Par { .. }) | None => {}
    }
}

/// Convertit une suite de jetons en RPN.
/// `liees` : noms utilisables comme variables (paramètres d’une définition).
///
/// Exemple:
///   jetons: 2 * f ( 1 , x )
///   rpn:    2 1 x f/2 *
pub fn to_rpn(jetons: &[Jeton], liees: &[String]) -> Result<Vec<Rpn>, ErreurSyntaxe> {
    if jetons.is_empty() {
        return Err(ErreurSyntaxe::Vide);
    }
    if jetons.len() > JETONS_MAX {
        return Err(ErreurSyntaxe::TropLong { n: jetons.len() });
    }

    let mut out: Vec<Rpn> = Vec::with_capacity(jetons.len());
    let mut ops: Vec<Pile> = Vec::new();

    // true tant qu’on attend un opérande (début, après opérateur, après '(' ou ',')
    let mut attend_valeur = true;
    let mut profondeur: usize = 0;

    let mut i = 0;
    while i < jetons.len() {
        let pos = jetons[i].pos;

        match &jetons[i].tok {
            Tok::Entier(_) | Tok::Reel(_) => {
                if !attend_valeur {
                    return Err(ErreurSyntaxe::JetonInattendu { pos });
                }
                let v = jetons[i].tok.valeur().ok_or(ErreurSyntaxe::Incoherente)?;
                out.push(Rpn::Lit(v));
                attend_valeur = false;
            }

            Tok::Ident(nom) => {
                if !attend_valeur {
                    return Err(ErreurSyntaxe::JetonInattendu { pos });
                }

                if let Some(par) = jetons.get(i + 1).filter(|j| j.tok == Tok::LPar) {
                    profondeur += 1;
                    if profondeur > PROFONDEUR_MAX {
                        return Err(ErreurSyntaxe::TropProfond { pos: par.pos });
                    }

                    // appel sans argument : f()
                    if matches!(jetons.get(i + 2), Some(j) if j.tok == Tok::RPar) {
                        profondeur -= 1;
                        out.push(Rpn::Appel(nom.clone(), 0));
                        attend_valeur = false;
                        i += 3;
                        continue;
                    }

                    ops.push(Pile::Par {
                        pos: par.pos,
                        appel: Some(nom.clone()),
                        virgules: 0,
                    });
                    i += 2;
                    continue;
                }

                if !liees.iter().any(|l| l == nom) && constante(nom).is_none() {
                    return Err(ErreurSyntaxe::IdentInconnu {
                        pos,
                        nom: nom.clone(),
                    });
                }
                out.push(Rpn::Var(nom.clone()));
                attend_valeur = false;
            }

            Tok::LPar => {
                if !attend_valeur {
                    return Err(ErreurSyntaxe::JetonInattendu { pos });
                }
                profondeur += 1;
                if profondeur > PROFONDEUR_MAX {
                    return Err(ErreurSyntaxe::TropProfond { pos });
                }
                ops.push(Pile::Par {
                    pos,
                    appel: None,
                    virgules: 0,
                });
            }

            Tok::RPar => {
                if attend_valeur {
                    return Err(ErreurSyntaxe::JetonInattendu { pos });
                }
                // dépile jusqu’à '('
                loop {
                    match ops.pop() {
                        None => return Err(ErreurSyntaxe::ParentheseFermante { pos }),
                        Some(Pile::Par {
                            appel, virgules, ..
                        }) => {
                            if let Some(nom) = appel {
                                out.push(Rpn::Appel(nom, virgules + 1));
                            }
                            break;
                        }
                        Some(Pile::Unaire(op)) => out.push(Rpn::Unaire(op)),
                        Some(Pile::Binaire(op)) => out.push(Rpn::Binaire(op)),
                    }
                }
                profondeur = profondeur.saturating_sub(1);
                attend_valeur = false;
            }

            Tok::Virgule => {
                if attend_valeur {
                    return Err(ErreurSyntaxe::JetonInattendu { pos });
                }
                // dépile jusqu’à la parenthèse de l’appel (qui reste sur la pile)
                loop {
                    match ops.last() {
                        None | Some(Pile::Par { appel: None, .. }) => {
                            return Err(ErreurSyntaxe::JetonInattendu { pos });
                        }
                        Some(Pile::Par { .. }) => break,
                        Some(_) => depiler(&mut ops, &mut out),
                    }
                }
                if let Some(Pile::Par { virgules, .. }) = ops.last_mut() {
                    *virgules += 1;
                }
                attend_valeur = true;
            }

            // moins unaire ; plus unaire : sans effet
            Tok::Moins | Tok::Plus if attend_valeur => {
                if jetons[i].tok == Tok::Moins {
                    ops.push(Pile::Unaire(OpUnaire::Neg));
                }
            }

            Tok::Non => {
                if !attend_valeur {
                    return Err(ErreurSyntaxe::JetonInattendu { pos });
                }
                ops.push(Pile::Unaire(OpUnaire::Non));
            }

            tok => {
                let op = op_binaire(tok).ok_or(ErreurSyntaxe::JetonInattendu { pos })?;
                if attend_valeur {
                    return Err(ErreurSyntaxe::JetonInattendu { pos });
                }

                // dépile tant que la précédence/associativité l’exige
                while let Some(top) = ops.last() {
                    let p_top = match top {
                        Pile::Par { .. } => break,
                        Pile::Unaire(_) => PRIO_UNAIRE,
                        Pile::Binaire(o) => precedence(*o),
                    };
                    let p_op = precedence(op);

                    let doit_pop = if is_right_associative(op) {
                        p_top > p_op
                    } else {
                        p_top >= p_op
                    };

                    if doit_pop {
                        depiler(&mut ops, &mut out);
                    } else {
                        break;
                    }
                }

                ops.push(Pile::Binaire(op));
                attend_valeur = true;
            }
        }

        i += 1;
    }

    if attend_valeur {
        let pos = jetons.last().map(|j| j.pos).unwrap_or(0);
        return Err(ErreurSyntaxe::JetonInattendu { pos });
    }

    // vide la pile ops
    while let Some(p) = ops.pop() {
        match p {
            Pile::Par { pos, .. } => return Err(ErreurSyntaxe::ParentheseOuvrante { pos }),
            Pile::Unaire(op) => out.push(Rpn::Unaire(op)),
            Pile::Binaire(op) => out.push(Rpn::Binaire(op)),
        }
    }

    Ok(out)
}

/// Construit une Expr à partir d’une RPN.
pub fn from_rpn(rpn: &[Rpn]) -> Result<Expr, ErreurSyntaxe> {
    let mut st: Vec<Expr> = Vec::new();

    for item in rpn.iter().cloned() {
        match item {
            Rpn::Lit(v) => st.push(Expr::Lit(v)),
            Rpn::Var(nom) => st.push(Expr::Var(nom)),

            Rpn::Unaire(op) => {
                let x = st.pop().ok_or(ErreurSyntaxe::Incoherente)?;
                st.push(Expr::Unaire(op, Box::new(x)));
            }

            Rpn::Binaire(op) => {
                let b = st.pop().ok_or(ErreurSyntaxe::Incoherente)?;
                let a = st.pop().ok_or(ErreurSyntaxe::Incoherente)?;
                st.push(Expr::Binaire(op, Box::new(a), Box::new(b)));
            }

            Rpn::Appel(nom, n) => {
                if st.len() < n {
                    return Err(ErreurSyntaxe::Incoherente);
                }
                let args = st.split_off(st.len() - n);
                st.push(Expr::Appel(nom, args));
            }
        }
    }

    let e = st.pop().ok_or(ErreurSyntaxe::Incoherente)?;
    if !st.is_empty() {
        return Err(ErreurSyntaxe::Incoherente);
    }
    Ok(e)
}

/// Reconnaît `nom(p1, …, pn) =` en tête de ligne.
/// Retourne (nom, paramètres, index du premier jeton du corps).
fn tete_definition(
    jetons: &[Jeton],
) -> Result<Option<(String, Vec<String>, usize)>, ErreurSyntaxe> {
    let nom = match jetons.first().map(|j| &j.tok) {
        Some(Tok::Ident(n)) => n,
        _ => return Ok(None),
    };
    if !matches!(jetons.get(1), Some(j) if j.tok == Tok::LPar) {
        return Ok(None);
    }

    // parenthèse fermante correspondante
    let mut niveau: usize = 0;
    let mut fin = None;
    for (k, j) in jetons.iter().enumerate().skip(1) {
        match j.tok {
            Tok::LPar => niveau += 1,
            Tok::RPar => {
                niveau -= 1;
                if niveau == 0 {
                    fin = Some(k);
                    break;
                }
            }
            _ => {}
        }
    }

    // pas de fermante : le parse normal signalera l’erreur
    let Some(fin) = fin else {
        return Ok(None);
    };
    if !matches!(jetons.get(fin + 1), Some(j) if j.tok == Tok::Egal) {
        return Ok(None);
    }

    // Ident (',' Ident)*
    let tete = &jetons[2..fin];
    let mut params: Vec<String> = Vec::new();
    for (k, j) in tete.iter().enumerate() {
        match (&j.tok, k % 2) {
            (Tok::Ident(p), 0) => {
                if params.contains(p) {
                    return Err(ErreurSyntaxe::ParametreDuplique { nom: p.clone() });
                }
                params.push(p.clone());
            }
            (Tok::Virgule, 1) => {}
            _ => return Err(ErreurSyntaxe::JetonInattendu { pos: j.pos }),
        }
    }
    if !tete.is_empty() && tete.len() % 2 == 0 {
        // virgule finale : f(x,) = …
        return Err(ErreurSyntaxe::JetonInattendu {
            pos: jetons[fin].pos,
        });
    }

    Ok(Some((nom.clone(), params, fin + 2)))
}

/// API du parser : une ligne => définition ou expression à évaluer.
pub fn parse_ligne(jetons: &[Jeton]) -> Result<Ligne, ErreurSyntaxe> {
    if let Some((nom, params, debut)) = tete_definition(jetons)? {
        let corps = from_rpn(&to_rpn(&jetons[debut..], &params)?)?;
        let def = Definition { nom, params, corps };
        trace!("définition: {def}");
        return Ok(Ligne::Definition(def));
    }

    let expr = from_rpn(&to_rpn(jetons, &[])?)?;
    trace!("expression: {expr}");
    Ok(Ligne::Valeur(expr))
}
