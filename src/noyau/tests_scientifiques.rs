//! Tests scientifiques (campagne) : scénarios complets à travers la session.
//!
//! But : vérifier les invariants visibles par l’utilisateur, ligne par ligne.
//! - définitions / redéfinitions / résolution tardive
//! - diagnostics (texte exact)
//! - modes de sortie hex / bin
//! - limites contrôlées (budget temps, tailles bornées)

use std::time::{Duration, Instant};

use super::commande::{Commande, Reponse, Session, Statut};
use super::rpn::PROFONDEUR_MAX;

fn reponse(s: &mut Session, ligne: &str) -> Reponse {
    match s.traiter_ligne(ligne) {
        Commande::Calcul(r) => r,
        autre => panic!("ligne={ligne:?} : calcul attendu, obtenu {autre:?}"),
    }
}

/// Texte affiché après "  = " (panique si la ligne n’est pas un résultat).
fn resultat(s: &mut Session, ligne: &str) -> String {
    let r = reponse(s, ligne);
    assert_eq!(r.statut, Statut::NumeriqueOk, "ligne={ligne:?} texte={:?}", r.texte);
    r.texte
        .lines()
        .find_map(|l| l.strip_prefix("  = "))
        .unwrap_or_else(|| panic!("ligne={ligne:?} : pas de résultat dans {:?}", r.texte))
        .to_string()
}

fn assert_statut(s: &mut Session, ligne: &str, attendu: Statut) {
    let r = reponse(s, ligne);
    assert_eq!(r.statut, attendu, "ligne={ligne:?} texte={:?}", r.texte);
    assert!(r.texte.ends_with("\n> "), "ligne={ligne:?}");
}

/// Lignes "User" de l’aide (hors "(none)").
fn fonctions_definies(s: &Session) -> usize {
    s.aide()
        .lines()
        .filter(|l| l.starts_with("  User") && !l.ends_with("(none)"))
        .count()
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Fonctions utilisateur ------------------------ */

#[test]
fn sci_redefinition_remplace() {
    let mut s = Session::default();
    assert_statut(&mut s, "f(x) = x * x", Statut::FonctionDefinie);
    assert_eq!(resultat(&mut s, "f(3)"), "9");
    assert_statut(&mut s, "f(x) = x + 1", Statut::FonctionDefinie);
    assert_eq!(resultat(&mut s, "f(3)"), "4");
    assert_eq!(fonctions_definies(&s), 1);
}

#[test]
fn sci_resolution_tardive() {
    let mut s = Session::default();
    // g référence h avant que h existe : accepté à la définition
    assert_statut(&mut s, "g(x) = h(x) * 2", Statut::FonctionDefinie);
    assert_statut(&mut s, "g(1)", Statut::FonctionInconnue);

    assert_statut(&mut s, "h(x) = x + 10", Statut::FonctionDefinie);
    assert_eq!(resultat(&mut s, "g(1)"), "22");

    // redéfinir h change g
    s.traiter_ligne("h(x) = 0");
    assert_eq!(resultat(&mut s, "g(5)"), "0");
}

#[test]
fn sci_plusieurs_parametres_et_natives() {
    let mut s = Session::default();
    s.traiter_ligne("hyp(a, b) = sqrt(a^2 + b^2)");
    assert_eq!(resultat(&mut s, "hyp(3, 4)"), "5");
    assert_eq!(resultat(&mut s, "max(hyp(6, 8), 7)"), "10");
    assert_statut(&mut s, "hyp(3)", Statut::AriteIncorrecte);
    assert!(reponse(&mut s, "hyp(1)")
        .texte
        .contains("  * Function 'hyp' expects 2 argument(s)!"));
}

#[test]
fn sci_definition_masque_une_native() {
    let mut s = Session::default();
    assert_eq!(resultat(&mut s, "abs(-3)"), "3");
    s.traiter_ligne("abs(x) = 42");
    assert_eq!(resultat(&mut s, "abs(-3)"), "42");
}

#[test]
fn sci_definition_invalide() {
    let mut s = Session::default();
    // paramètre libre
    assert_statut(&mut s, "f(x) = x + y", Statut::ErreurSyntaxe);
    // paramètre répété
    assert_statut(&mut s, "f(x, x) = x", Statut::ErreurSyntaxe);
    assert_eq!(fonctions_definies(&s), 0);
}

/* ------------------------ Hiérarchie des opérateurs ------------------------ */

#[test]
fn sci_hierarchie() {
    let mut s = Session::default();
    let cas = [
        ("2 + 3 * 4", "14"),
        ("(2 + 3) * 4", "20"),
        ("2 ^ 3 ^ 2", "512"),
        ("2 ** 10", "1024"),
        ("-2 ^ 2", "4"),
        ("10 - 4 - 3", "3"),
        ("7 % 4", "3"),
        ("1 + 2 << 1", "6"),
        ("1 or 2 and 3", "3"),
        ("6 and 3", "2"),
        ("5 xor 1", "4"),
        ("not 0", "-1"),
        ("1 << 4", "16"),
        ("256 >> 4", "16"),
        ("3 > 2", "1"),
        ("3 <= 2", "0"),
        ("1 + 1 == 2", "1"),
        ("0x1F + 1", "32"),
    ];
    for (ligne, attendu) in cas {
        assert_eq!(resultat(&mut s, ligne), attendu, "ligne={ligne:?}");
    }
}

/* ------------------------ Diagnostics ------------------------ */

#[test]
fn sci_erreurs_d_evaluation() {
    let mut s = Session::default();
    assert_statut(&mut s, "1/0", Statut::DivisionParZero);
    assert_statut(&mut s, "5 % (2 - 2)", Statut::DivisionParZero);
    assert_statut(&mut s, "1e20 and 1", Statut::BooleenTropGrand);
    assert_statut(&mut s, "1 << 40", Statut::BooleenTropGrand);
    assert_statut(&mut s, "nope(1)", Statut::FonctionInconnue);
    assert_statut(&mut s, "(1 + 2", Statut::ErreurSyntaxe);
    assert_statut(&mut s, "3 $ 4", Statut::ErreurSyntaxe);
    assert_statut(&mut s, "zz + 1", Statut::ErreurSyntaxe);
}

#[test]
fn sci_erreur_ne_modifie_pas_la_session() {
    let mut s = Session::default();
    s.traiter_ligne("f(x) = 2 * x");
    s.traiter_ligne("f(x) = ");
    s.traiter_ligne("1/0");
    assert_eq!(resultat(&mut s, "f(21)"), "42");
}

/* ------------------------ Sorties ------------------------ */

#[test]
fn sci_modes_de_sortie() {
    let mut s = Session::default();
    assert_eq!(resultat(&mut s, "hex(255)"), "0xFF");
    assert_eq!(resultat(&mut s, "bin(10)"), "0b 1010");
    assert_eq!(resultat(&mut s, "hex(1.5)"), "0x3FC00000 f");
    assert_eq!(resultat(&mut s, "hex(0 - 1)"), "0xFFFFFFFFFFFFFFFF");

    let r = reponse(&mut s, "bin(1.5)");
    assert_eq!(r.statut, Statut::ErreurFormat);
    assert_eq!(
        r.texte,
        "  bin(1.5)\n  * Binary output only supported for integers!\n> "
    );
}

#[test]
fn sci_entiers_sans_point_et_aller_retour_i64() {
    let mut s = Session::default();
    for ligne in ["6 * 7", "2 ^ 40", "0 - 123456789", "1e15", "floor(2.7)", "9 / 3"] {
        let txt = resultat(&mut s, ligne);
        assert!(!txt.contains('.'), "ligne={ligne:?} => {txt}");
        let n: i64 = txt
            .parse()
            .unwrap_or_else(|e| panic!("ligne={ligne:?} => {txt} ({e})"));
        assert_eq!(n.to_string(), txt);
    }
}

#[test]
fn sci_reels_et_exponentielle() {
    let mut s = Session::default();
    assert_eq!(resultat(&mut s, "1/3"), "0.33333");
    assert_eq!(resultat(&mut s, "1/20"), "5.00000E-02");
    assert_eq!(resultat(&mut s, "2469135/2"), "1.23457E+06");
    assert_eq!(resultat(&mut s, "sqrt(0 - 1)"), "NAN");
    assert_eq!(resultat(&mut s, "exp(1000) + 0.5"), "INF");
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_imbrication_bornee() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2000);
    let mut s = Session::default();

    let n = PROFONDEUR_MAX - 1;
    let ok = format!("{}1{}", "(".repeat(n), ")".repeat(n));
    assert_eq!(resultat(&mut s, &ok), "1");
    budget(t0, max);

    let trop = format!("{}1{}", "(".repeat(PROFONDEUR_MAX + 10), ")".repeat(PROFONDEUR_MAX + 10));
    assert_statut(&mut s, &trop, Statut::ErreurSyntaxe);
    budget(t0, max);
}

#[test]
fn sci_stress_recursion_utilisateur() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2000);
    let mut s = Session::default();

    s.traiter_ligne("f(x) = f(x + 1) + 1");
    assert_statut(&mut s, "f(0)", Statut::RecursionTropProfonde);
    budget(t0, max);

    // récursion mutuelle
    s.traiter_ligne("a(x) = b(x)");
    s.traiter_ligne("b(x) = a(x)");
    assert_statut(&mut s, "a(1)", Statut::RecursionTropProfonde);
    budget(t0, max);
}

#[test]
fn sci_stress_somme_lineaire() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2000);
    let mut s = Session::default();

    // 2000 termes (~4000 jetons, sous JETONS_MAX) : aucune parenthèse, aucun appel
    let expr = vec!["1"; 2000].join(" + ");
    assert_eq!(resultat(&mut s, &expr), "2000");
    budget(t0, max);

    let expr = vec!["2"; 1000].join(" - ");
    assert_eq!(resultat(&mut s, &expr), "-1996");
    budget(t0, max);

    // appels utilisateur successifs : seuls les appels IMBRIQUÉS sont bornés
    s.traiter_ligne("un() = 1");
    let expr = vec!["un()"; 800].join("+");
    assert_eq!(resultat(&mut s, &expr), "800");
    budget(t0, max);
}

#[test]
fn sci_grand_entier_litteral() {
    let mut s = Session::default();
    // au-delà de u64 : lu exactement, arrondi seulement à la conversion f64
    assert_eq!(resultat(&mut s, "18446744073709551617 - 2^64"), "0");
    assert_eq!(resultat(&mut s, "18446744073709551616 / 2^63"), "2");
}
