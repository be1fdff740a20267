//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler la session sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - invariant clé : toute réponse se termine par l’invite "> "
//! - sans division ni booléen : résultat fini, jamais d’erreur

use std::time::{Duration, Instant};

use super::commande::{Commande, Reponse, Session, Statut};

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn calcul(s: &mut Session, ligne: &str) -> Reponse {
    match s.traiter_ligne(ligne) {
        Commande::Calcul(r) => r,
        autre => panic!("ligne={ligne:?} : calcul attendu, obtenu {autre:?}"),
    }
}

fn valeur(r: &Reponse) -> Option<&str> {
    r.texte.lines().find_map(|l| l.strip_prefix("  = "))
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn gen_nombre(rng: &mut Rng) -> String {
    match rng.pick(4) {
        0 => format!("{}", rng.pick(100)),
        1 => {
            if rng.coin() {
                format!("{}.{}", rng.pick(10), rng.pick(100))
            } else {
                format!(".{}", rng.pick(100))
            }
        }
        2 => format!("0x{:X}", rng.pick(256)),
        _ => format!("{}", rng.pick(10)),
    }
}

/// Arithmétique + - * (et unaire) sur littéraux bornés : toujours fini.
fn gen_arith(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_nombre(rng);
    }

    match rng.pick(6) {
        0 => gen_nombre(rng),
        1 => format!("({}+{})", gen_arith(rng, depth - 1), gen_arith(rng, depth - 1)),
        2 => format!("({}-{})", gen_arith(rng, depth - 1), gen_arith(rng, depth - 1)),
        3 => format!("({}*{})", gen_arith(rng, depth - 1), gen_arith(rng, depth - 1)),
        4 => format!("-({})", gen_arith(rng, depth - 1)),
        _ => format!("abs({})", gen_arith(rng, depth - 1)),
    }
}

/// Division, booléens, comparaisons et fonctions natives : erreurs possibles.
fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return match rng.pick(5) {
            0 => "pi".to_string(),
            1 => "e".to_string(),
            _ => gen_nombre(rng),
        };
    }

    let a = gen_expr(rng, depth - 1);
    match rng.pick(12) {
        0 => format!("({a}/{})", gen_expr(rng, depth - 1)),
        1 => format!("({a}%{})", gen_expr(rng, depth - 1)),
        2 => format!("({a} and {})", gen_expr(rng, depth - 1)),
        3 => format!("({a} xor {})", gen_expr(rng, depth - 1)),
        4 => format!("({a}<<{})", rng.pick(40)),
        5 => format!("({a}^{})", rng.pick(4)),
        6 => format!("sqrt({a})"),
        7 => format!("min({a}, {})", gen_expr(rng, depth - 1)),
        8 => format!("({a}>={})", gen_expr(rng, depth - 1)),
        9 => format!("not {a}"),
        10 => format!("({a}*{})", gen_expr(rng, depth - 1)),
        _ => format!("({a}+{})", gen_expr(rng, depth - 1)),
    }
}

/// Ligne complète : parfois préfixée par un mode de sortie.
fn gen_ligne(rng: &mut Rng) -> String {
    let corps = gen_expr(rng, 4);
    match rng.pick(4) {
        0 => format!("hex({corps})"),
        1 => format!("bin({corps})"),
        _ => corps,
    }
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_arithmetique_toujours_finie() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2000);

    let mut rng = Rng::new(0xC0FFEE_u64);
    let mut s = Session::default();

    for _ in 0..200 {
        budget(t0, max);

        let expr = gen_arith(&mut rng, 5);
        let r = calcul(&mut s, &expr);
        assert_eq!(r.statut, Statut::NumeriqueOk, "expr={expr:?} texte={:?}", r.texte);

        let v = valeur(&r).unwrap_or_else(|| panic!("expr={expr:?} : pas de résultat"));
        assert!(
            !v.contains("INF") && !v.contains("NAN"),
            "expr={expr:?} => {v}"
        );
    }
}

#[test]
fn fuzz_safe_determinisme_et_invite() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2000);

    // Même seed => mêmes lignes => mêmes réponses (deux sessions indépendantes)
    let mut rng1 = Rng::new(0xBADC0DE_u64);
    let mut rng2 = Rng::new(0xBADC0DE_u64);
    let mut s1 = Session::default();
    let mut s2 = Session::default();

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..200 {
        budget(t0, max);

        let l1 = gen_ligne(&mut rng1);
        let l2 = gen_ligne(&mut rng2);
        assert_eq!(l1, l2);

        let r1 = calcul(&mut s1, &l1);
        let r2 = calcul(&mut s2, &l2);
        assert_eq!(r1, r2, "ligne={l1:?}");

        assert!(r1.texte.starts_with(&format!("  {l1}\n")), "ligne={l1:?}");
        assert!(r1.texte.ends_with("\n> "), "ligne={l1:?}");
        assert_eq!(r1.ligne_resultat, valeur(&r1).is_some(), "ligne={l1:?}");

        if r1.statut == Statut::NumeriqueOk {
            seen_ok += 1;
        } else {
            seen_err += 1;
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 10, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_bruit_ne_panique_jamais() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2000);

    const ALPHABET: &[u8] = b"0123456789.xe+-*/%^()<>=!,abfn ~&|$";
    let mut rng = Rng::new(0x5EED_u64);
    let mut s = Session::default();

    for _ in 0..300 {
        budget(t0, max);

        let n = 1 + rng.pick(24) as usize;
        let ligne: String = (0..n)
            .map(|_| ALPHABET[rng.pick(ALPHABET.len() as u32) as usize] as char)
            .collect();

        match s.traiter_ligne(&ligne) {
            Commande::Calcul(r) => assert!(r.texte.ends_with("\n> "), "ligne={ligne:?}"),
            Commande::Rien => assert!(ligne.trim().is_empty()),
            autre => panic!("ligne={ligne:?} : commande inattendue {autre:?}"),
        }
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2000);

    // 600 termes : ~3600 jetons, sous la limite de longueur
    let expr = somme_balancee("1/2", 600);
    budget(t0, max);

    let mut s = Session::default();
    let r = calcul(&mut s, &expr);

    // 600*(1/2) = 300
    assert_eq!(valeur(&r), Some("300"), "texte={:?}", r.texte);
}
