// src/config.rs
//
// Configuration PeaCalc (fichier TOML)
// ------------------------------------
// - Mode portable : `peacalc.toml` présent dans le dossier courant
// - Sinon         : <config_dir>/peacalc/peacalc.toml
//
// Contrats :
// - Fichier absent ou illisible => valeurs par défaut (journalisé), jamais fatal.
// - Chaque champ hors bornes revient à SA valeur par défaut (les autres sont gardés).
// - `lines` est toujours impair.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Nom du fichier (portable ou dans le dossier utilisateur).
pub const FICHIER: &str = "peacalc.toml";

const MAX_TOP: u32 = 1000;
const MAX_LEFT: u32 = 5000;
const MAX_HEIGHT: u32 = 1000;
const MAX_WIDTH: u32 = 2000;
const MAX_PRECISION: u32 = 15;
const MAX_LINES: u32 = 255;
const MAX_FONT_SIZE: u32 = 30;
const MAX_COLOR_MODE: u8 = 2;
const MAX_OPACITY: u32 = 255;

/// Couleur RGB (0..=255 par canal).
pub type Rgb = [u8; 3];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Position de la fenêtre (None : laissée au système)
    pub top: Option<u32>,
    pub left: Option<u32>,
    pub height: u32,
    pub width: u32,
    /// Opacité de la fenêtre (0..=255) : conservée, pas appliquée par egui
    pub opacity: u32,
    /// Décimales des résultats réels
    pub precision: u32,
    /// Lignes gardées dans la zone de texte
    pub lines: u32,
    pub font_size: u32,
    /// 0 : suit le système, 1 : clair, 2 : sombre
    pub color_mode: u8,
    pub light_bg: String,
    pub light_txt: String,
    pub dark_bg: String,
    pub dark_txt: String,
    pub result_light: String,
    pub result_dark: String,
    /// Dernier contenu de la zone de texte
    pub text: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            top: None,
            left: None,
            height: 190,
            width: 640,
            opacity: 90,
            precision: 5,
            lines: 45, // 44 forcé impair
            font_size: 25,
            color_mode: 0,
            light_bg: "FFFFFF".to_string(),
            light_txt: "000000".to_string(),
            dark_bg: "000000".to_string(),
            dark_txt: "FFFFFF".to_string(),
            result_light: "00008B".to_string(),
            result_dark: "00BFFF".to_string(),
            text: String::new(),
        }
    }
}

/// Couleurs effectives de la zone de texte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Couleurs {
    pub fond: Rgb,
    pub texte: Rgb,
    pub resultat: Rgb,
}

impl Config {
    /// Ramène chaque champ dans ses bornes (valeur par défaut sinon).
    pub fn borner(&mut self) {
        let d = Config::default();

        if self.top.is_some_and(|v| v > MAX_TOP) {
            warn!("config : top hors bornes, ignoré");
            self.top = d.top;
        }
        if self.left.is_some_and(|v| v > MAX_LEFT) {
            warn!("config : left hors bornes, ignoré");
            self.left = d.left;
        }
        borne(&mut self.height, 1, MAX_HEIGHT, d.height, "height");
        borne(&mut self.width, 1, MAX_WIDTH, d.width, "width");
        borne(&mut self.opacity, 0, MAX_OPACITY, d.opacity, "opacity");
        borne(&mut self.precision, 0, MAX_PRECISION, d.precision, "precision");
        borne(&mut self.lines, 1, MAX_LINES, d.lines, "lines");
        borne(&mut self.font_size, 1, MAX_FONT_SIZE, d.font_size, "font_size");
        if self.color_mode > MAX_COLOR_MODE {
            warn!("config : color_mode hors bornes ({}), défaut", self.color_mode);
            self.color_mode = d.color_mode;
        }

        if self.lines % 2 == 0 {
            self.lines += 1;
        }
    }

    /// Lecture + bornes. Erreur si le fichier est illisible ou mal formé.
    pub fn charger(chemin: &Path) -> Result<Config> {
        let contenu = fs::read_to_string(chemin)
            .with_context(|| format!("lecture impossible : {}", chemin.display()))?;
        let mut cfg: Config = toml::from_str(&contenu)
            .with_context(|| format!("TOML invalide : {}", chemin.display()))?;
        cfg.borner();
        Ok(cfg)
    }

    /// N’échoue jamais : défauts si absent / illisible.
    pub fn charger_ou_defaut(chemin: Option<&Path>) -> Config {
        let Some(chemin) = chemin else {
            debug!("config : aucun emplacement, valeurs par défaut");
            return Config::default();
        };

        if !chemin.exists() {
            debug!("config : {} absent, valeurs par défaut", chemin.display());
            return Config::default();
        }

        match Config::charger(chemin) {
            Ok(cfg) => {
                info!("config chargée : {}", chemin.display());
                cfg
            }
            Err(e) => {
                warn!("config ignorée ({e:#}), valeurs par défaut");
                Config::default()
            }
        }
    }

    /// Écriture (crée le dossier au besoin).
    pub fn sauver(&self, chemin: &Path) -> Result<()> {
        if let Some(dossier) = chemin.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dossier)
                .with_context(|| format!("création impossible : {}", dossier.display()))?;
        }

        let contenu = toml::to_string_pretty(self).context("sérialisation TOML")?;
        fs::write(chemin, contenu)
            .with_context(|| format!("écriture impossible : {}", chemin.display()))?;

        info!("config sauvée : {}", chemin.display());
        Ok(())
    }

    /// Thème sombre ? (`systeme_sombre` : préférence du système si connue)
    pub fn est_sombre(&self, systeme_sombre: bool) -> bool {
        match self.color_mode {
            1 => false,
            2 => true,
            _ => systeme_sombre,
        }
    }

    pub fn couleurs(&self, sombre: bool) -> Couleurs {
        let d = Config::default();
        if sombre {
            Couleurs {
                fond: couleur_hex(&self.dark_bg, hex_ou_noir(&d.dark_bg)),
                texte: couleur_hex(&self.dark_txt, hex_ou_noir(&d.dark_txt)),
                resultat: couleur_hex(&self.result_dark, hex_ou_noir(&d.result_dark)),
            }
        } else {
            Couleurs {
                fond: couleur_hex(&self.light_bg, hex_ou_noir(&d.light_bg)),
                texte: couleur_hex(&self.light_txt, hex_ou_noir(&d.light_txt)),
                resultat: couleur_hex(&self.result_light, hex_ou_noir(&d.result_light)),
            }
        }
    }
}

/// Emplacement du fichier : portable d’abord, puis dossier de configuration utilisateur.
pub fn chemin() -> Option<PathBuf> {
    let portable = PathBuf::from(FICHIER);
    if portable.exists() {
        debug!("config : mode portable");
        return Some(portable);
    }
    dirs::config_dir().map(|d| d.join("peacalc").join(FICHIER))
}

/// "RRGGBB" (avec ou sans '#') -> RGB ; invalide => `defaut`.
pub fn couleur_hex(s: &str, defaut: Rgb) -> Rgb {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.len() != 6 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return defaut;
    }

    let canal = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
    match (canal(0), canal(2), canal(4)) {
        (Some(r), Some(g), Some(b)) => [r, g, b],
        _ => defaut,
    }
}

fn hex_ou_noir(s: &str) -> Rgb {
    couleur_hex(s, [0, 0, 0])
}

fn borne(v: &mut u32, min: u32, max: u32, defaut: u32, nom: &str) {
    if *v < min || *v > max {
        warn!("config : {nom} hors bornes ({v}), défaut {defaut}");
        *v = defaut;
    }
}
