//! src/app/etat.rs
//!
//! État UI (sans vue).
//!
//! Rôle : contenir la zone de texte (historique), la ligne en cours de saisie,
//! la session du noyau et la configuration ; appliquer la commande rendue par
//! la session sans aucune logique d’affichage.
//!
//! Contrats :
//! - L’historique se termine TOUJOURS par l’invite "> ".
//! - Il ne dépasse jamais `config.lines` lignes (les plus anciennes partent).
//! - À la destruction : géométrie + historique réécrits dans la configuration.

use std::path::PathBuf;

use log::{debug, warn};

use crate::config::Config;
use crate::noyau::commande::INVITE;
use crate::noyau::{Commande, Session};

/// Dernière géométrie connue de la fenêtre (pixels logiques).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometrie {
    pub top: f32,
    pub left: f32,
    pub height: f32,
    pub width: f32,
}

#[derive(Debug)]
pub struct AppCalc {
    // --- noyau ---
    pub session: Session,

    // --- configuration (None : pas de sauvegarde, ex. web) ---
    pub config: Config,
    pub chemin_config: Option<PathBuf>,

    // --- zone de texte ---
    pub historique: String,
    pub entree: String,

    // --- UX ---
    // Permet à vue.rs de redonner le focus à l’entrée après une commande.
    pub focus_entree: bool,
    pub quitter: bool,
    pub geometrie: Option<Geometrie>,
}

impl Default for AppCalc {
    fn default() -> Self {
        Self::new(Config::default(), None)
    }
}

impl AppCalc {
    pub fn new(config: Config, chemin_config: Option<PathBuf>) -> Self {
        // texte sauvegardé repris seulement s’il finit par l’invite
        let historique = if config.text.ends_with(INVITE) {
            config.text.clone()
        } else {
            INVITE.to_string()
        };

        let mut app = Self {
            session: Session::new(config.precision as usize),
            config,
            chemin_config,
            historique,
            entree: String::new(),
            focus_entree: true, // au lancement, on veut pouvoir taper tout de suite
            quitter: false,
            geometrie: None,
        };
        app.tronquer();
        app
    }

    /* ------------------------ Actions ------------------------ */

    /// Enter : envoie la ligne saisie à la session et applique la commande.
    pub fn soumettre(&mut self) {
        let ligne = std::mem::take(&mut self.entree);
        self.focus_entree = true;

        match self.session.traiter_ligne(&ligne) {
            Commande::Rien => {}
            Commande::Quitter => {
                debug!("exit demandé");
                self.quitter = true;
            }
            Commande::Effacer => {
                self.historique = INVITE.to_string();
            }
            Commande::Aide(texte) => {
                self.historique.push_str(&ligne);
                self.historique.push('\n');
                self.historique.push_str(&texte);
            }
            Commande::Calcul(reponse) => {
                debug!(
                    "calcul : {:?} (ligne résultat : {})",
                    reponse.statut, reponse.ligne_resultat
                );
                // la ligne "> …" est remplacée par l’écho de la réponse
                if self.historique.ends_with(INVITE) {
                    let garde = self.historique.len() - INVITE.len();
                    self.historique.truncate(garde);
                }
                self.historique.push_str(&reponse.texte);
            }
        }

        self.tronquer();
    }

    /// ESC : efface seulement l’entrée.
    pub fn clear_entree(&mut self) {
        self.entree.clear();
        self.focus_entree = true;
    }

    /// Retire les lignes les plus anciennes au-delà de `config.lines`.
    pub fn tronquer(&mut self) {
        let max = self.config.lines.max(1) as usize;
        let n = self.historique.split('\n').count();
        if n <= max {
            return;
        }

        let a_retirer = n - max;
        if let Some((pos, _)) = self.historique.match_indices('\n').nth(a_retirer - 1) {
            self.historique.drain(..=pos);
        }
    }

    /// Historique sans l’invite finale (la vue dessine l’invite devant l’entrée).
    pub fn transcript(&self) -> &str {
        self.historique
            .strip_suffix(INVITE)
            .unwrap_or(&self.historique)
    }

    /* ------------------------ Configuration ------------------------ */

    /// Recopie géométrie + historique dans la configuration (bornée).
    pub fn maj_config(&mut self) {
        self.config.text = self.historique.clone();
        self.config.precision = self.session.precision() as u32;

        if let Some(g) = self.geometrie {
            self.config.top = Some(g.top.max(0.0).round() as u32);
            self.config.left = Some(g.left.max(0.0).round() as u32);
            self.config.height = g.height.max(1.0).round() as u32;
            self.config.width = g.width.max(1.0).round() as u32;
        }
        self.config.borner();
    }

    pub fn sauvegarder(&mut self) {
        self.maj_config();
        let Some(chemin) = self.chemin_config.as_deref() else {
            return;
        };
        if let Err(e) = self.config.sauver(chemin) {
            warn!("config non sauvée : {e:#}");
        }
    }
}

impl Drop for AppCalc {
    fn drop(&mut self) {
        self.sauvegarder();
    }
}
