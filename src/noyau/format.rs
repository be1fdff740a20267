// src/noyau/format.rs
//
// Affichage d’un résultat f64 selon le mode de sortie.
// Toute la classification entier / réel se fait ICI (l’évaluation reste en f64).

use super::erreurs::ErreurFormat;

/// Nombre total de chiffres au-delà duquel on réduit les décimales.
pub const PRECISION_MAX: usize = 15;

/// 2^63 : au-delà, pas de rendu entier en hexadécimal ni de binaire.
pub const SEUIL_GRAND_ENTIER: f64 = 9_223_372_036_854_775_808.0;

/// Bornes (exclusives) du rendu en virgule fixe.
const FIXE_MIN: f64 = 0.09;
const FIXE_MAX: f64 = 1_000_000.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModeSortie {
    #[default]
    Defaut,
    Hex,
    Bin,
}

/// Entier <=> partie fractionnaire exactement nulle (NaN / inf exclus).
pub fn est_entier(v: f64) -> bool {
    v.is_finite() && v.fract() == 0.0
}

/// API publique : texte affiché pour `v` (sans le préfixe "  = ").
/// `precision` (décimales des réels) est bornée à PRECISION_MAX.
pub fn format_resultat(v: f64, mode: ModeSortie, precision: usize) -> Result<String, ErreurFormat> {
    let precision = precision.min(PRECISION_MAX);

    match mode {
        ModeSortie::Defaut => {
            if est_entier(v) {
                Ok(format_entier(v))
            } else {
                Ok(format_reel(v, precision))
            }
        }
        ModeSortie::Hex => {
            if est_entier(v) && v.abs() < SEUIL_GRAND_ENTIER {
                Ok(format_hex_entier(v))
            } else {
                Ok(format_hex_reel(v))
            }
        }
        ModeSortie::Bin => {
            if !est_entier(v) {
                return Err(ErreurFormat::PasEntier);
            }
            if v.abs() >= SEUIL_GRAND_ENTIER {
                return Err(ErreurFormat::TropGrand);
            }
            Ok(format_bin(v))
        }
    }
}

/// Entier décimal signé 64 bits (conversion saturante au-delà).
fn format_entier(v: f64) -> String {
    format!("{}", v as i64)
}

fn format_non_fini(v: f64) -> String {
    if v.is_nan() {
        "NAN".to_string()
    } else if v > 0.0 {
        "INF".to_string()
    } else {
        "-INF".to_string()
    }
}

/// Virgule fixe entre 0.09 et 1 000 000 (exclus), exponentielle sinon.
fn format_reel(v: f64, precision: usize) -> String {
    if !v.is_finite() {
        return format_non_fini(v);
    }

    let a = v.abs();
    if a > FIXE_MIN && a < FIXE_MAX {
        // chiffres de la partie entière (au moins 1)
        let mut t = v / 10.0;
        let mut chiffres: usize = 1;
        while t.abs() > 1.0 {
            t /= 10.0;
            chiffres += 1;
        }

        let mut decimales = precision;
        if chiffres + decimales > PRECISION_MAX {
            decimales = PRECISION_MAX - chiffres + 1;
        }
        return format!("{v:.decimales$}");
    }

    format_exp(v, precision)
}

/// Notation scientifique façon printf "%E" : mantisse, 'E', signe, exposant sur 2 chiffres minimum.
fn format_exp(v: f64, precision: usize) -> String {
    let s = format!("{v:.precision$E}");
    match s.split_once('E') {
        Some((mantisse, exp)) => {
            let (signe, chiffres) = match exp.strip_prefix('-') {
                Some(c) => ('-', c),
                None => ('+', exp),
            };
            format!("{mantisse}E{signe}{chiffres:0>2}")
        }
        None => s,
    }
}

/// 0x + hexadécimal majuscule de la troncature i64 (complément à deux si négatif).
fn format_hex_entier(v: f64) -> String {
    format!("0x{:X}", v as i64)
}

/// Motif binaire IEEE-754 simple précision, octet de poids fort d’abord, suffixe " f".
fn format_hex_reel(v: f64) -> String {
    format!("0x{:08X} f", (v as f32).to_bits())
}

/// 0b + groupes de 4 bits (largeur minimale multiple de 4), un espace avant chaque groupe.
fn format_bin(v: f64) -> String {
    let t = v as i64;
    let magnitude = t.unsigned_abs();

    let mut largeur: u32 = 4;
    while largeur < 64 && (1u64 << largeur) <= magnitude {
        largeur += 4;
    }

    let mut out = String::from("0b");
    for pos in (0..largeur).rev() {
        if (pos + 1) % 4 == 0 {
            out.push(' ');
        }
        out.push(if (t >> pos) & 1 == 1 { '1' } else { '0' });
    }
    out
}
