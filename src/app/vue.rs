// src/app/vue.rs
//
// Vue (UI egui) — natif + web
// ---------------------------
// Objectifs :
// - Zone de texte façon console : historique + ligne "> " éditable
// - Lignes "  = …" dans la couleur des résultats
// - Enter envoie la ligne, focus redonné aussitôt (focus_entree)
//
// Note :
// - En singleline, egui rend le focus sur Enter : on teste lost_focus().

use eframe::egui;
use egui::text::LayoutJob;
use egui::{Color32, FontId, TextFormat};

use super::etat::{AppCalc, Geometrie};
use crate::config::Rgb;
use crate::noyau::commande::INVITE;

/// Préfixe des lignes de résultat (colorées).
const PREFIXE_RESULTAT: &str = "  = ";

fn couleur(c: Rgb) -> Color32 {
    Color32::from_rgb(c[0], c[1], c[2])
}

impl AppCalc {
    /// Thème clair / sombre + couleurs de fond et de texte de la configuration.
    pub fn appliquer_theme(&self, ctx: &egui::Context) {
        let systeme_sombre = matches!(ctx.system_theme(), Some(egui::Theme::Dark));
        let sombre = self.config.est_sombre(systeme_sombre);
        let c = self.config.couleurs(sombre);

        let mut visuals = if sombre {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        visuals.panel_fill = couleur(c.fond);
        visuals.extreme_bg_color = couleur(c.fond);
        visuals.override_text_color = Some(couleur(c.texte));
        ctx.set_visuals(visuals);
    }

    /// Relève la géométrie courante (sauvée à la fermeture).
    pub fn relever_geometrie(&mut self, ctx: &egui::Context) {
        let (externe, interne) = ctx.input(|i| (i.viewport().outer_rect, i.viewport().inner_rect));
        if let (Some(externe), Some(interne)) = (externe, interne) {
            self.geometrie = Some(Geometrie {
                top: externe.min.y,
                left: externe.min.x,
                height: interne.height(),
                width: interne.width(),
            });
        }
    }

    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        let police = FontId::monospace(self.config.font_size as f32);
        let sombre = ui.visuals().dark_mode;
        let c = self.config.couleurs(sombre);

        ui.spacing_mut().item_spacing = egui::vec2(0.0, 0.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                let job = mise_en_couleur(
                    self.transcript(),
                    police.clone(),
                    couleur(c.texte),
                    couleur(c.resultat),
                );
                if !job.text.is_empty() {
                    ui.label(job);
                }

                self.ui_entree(ui, police);
            });
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui, police: FontId) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(INVITE).font(police.clone()));

            // IMPORTANT : id stable + focus contrôlé
            let resp = ui.add(
                egui::TextEdit::singleline(&mut self.entree)
                    .id_salt("entree_console")
                    .font(police)
                    .frame(false)
                    .desired_width(f32::INFINITY),
            );

            if self.focus_entree {
                resp.request_focus();
                self.focus_entree = false;
            }

            let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
            if resp.lost_focus() && enter {
                self.soumettre();
            }
        });
    }
}

/// Une section par ligne : couleur résultat pour "  = …", couleur texte sinon.
fn mise_en_couleur(texte: &str, police: FontId, normal: Color32, resultat: Color32) -> LayoutJob {
    let mut job = LayoutJob::default();
    for ligne in texte.split_inclusive('\n') {
        let c = if ligne.starts_with(PREFIXE_RESULTAT) {
            resultat
        } else {
            normal
        };
        job.append(ligne, 0.0, TextFormat::simple(police.clone(), c));
    }
    // le dernier '\n' précède la ligne d’entrée dessinée à part
    if job.text.ends_with('\n') {
        job.text.pop();
        if let Some(s) = job.sections.last_mut() {
            s.byte_range.end = job.text.len();
        }
    }
    job
}
