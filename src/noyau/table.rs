// src/noyau/table.rs
//
// Table des fonctions utilisateur (durée de vie : la session).
// - clés en minuscules, uniques
// - definir() remplace une définition existante (pas de surcharge)
// - aucune validation croisée : les appels sont résolus à l’évaluation

use std::collections::HashMap;

use super::expr::Definition;

#[derive(Clone, Debug, Default)]
pub struct TableFonctions {
    fonctions: HashMap<String, Definition>,
}

impl TableFonctions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute ou remplace. Retourne true si une définition a été remplacée.
    pub fn definir(&mut self, mut def: Definition) -> bool {
        def.nom = def.nom.to_lowercase();
        self.fonctions.insert(def.nom.clone(), def).is_some()
    }

    pub fn chercher(&self, nom: &str) -> Option<&Definition> {
        self.fonctions.get(&nom.to_lowercase())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.fonctions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonctions.is_empty()
    }

    /// Définitions triées par nom (affichage déterministe).
    pub fn definitions(&self) -> Vec<&Definition> {
        let mut v: Vec<&Definition> = self.fonctions.values().collect();
        v.sort_by(|a, b| a.nom.cmp(&b.nom));
        v
    }
}
