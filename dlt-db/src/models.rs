use std::collections::BTreeSet;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Nombre total de groupes produits par génération.
pub const GROUP_COUNT: u8 = 13;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRecord {
    pub issue_id: String,
    pub date: String,
    /// Ordre de saisie conservé : le modèle positionnel en dépend.
    pub front: [u8; 5],
    pub back: [u8; 2],
    pub blocked: bool,
}

impl DrawRecord {
    pub fn new(issue_id: impl Into<String>, date: impl Into<String>, front: [u8; 5], back: [u8; 2]) -> Self {
        Self {
            issue_id: issue_id.into(),
            date: date.into(),
            front,
            back,
            blocked: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Front,
    Back,
}

impl Zone {
    pub fn size(&self) -> usize {
        match self {
            Zone::Front => 35,
            Zone::Back => 12,
        }
    }

    pub fn pick_count(&self) -> usize {
        match self {
            Zone::Front => 5,
            Zone::Back => 2,
        }
    }

    pub fn numbers_from<'a>(&self, draw: &'a DrawRecord) -> &'a [u8] {
        match self {
            Zone::Front => &draw.front,
            Zone::Back => &draw.back,
        }
    }

    pub fn numbers_of<'a>(&self, group: &'a GroupResult) -> &'a [u8] {
        match self {
            Zone::Front => &group.front,
            Zone::Back => &group.back,
        }
    }

    /// 1..=size, croissant.
    pub fn domain(&self) -> impl Iterator<Item = u8> {
        1..=self.size() as u8
    }

    pub fn contains(&self, n: u8) -> bool {
        n >= 1 && (n as usize) <= self.size()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Zone::Front => "front",
            Zone::Back => "back",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupResult {
    pub front: Vec<u8>,
    pub back: Vec<u8>,
}

impl GroupResult {
    pub fn new(mut front: Vec<u8>, mut back: Vec<u8>) -> Self {
        front.sort_unstable();
        back.sort_unstable();
        Self { front, back }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_empty() && self.back.is_empty()
    }

    /// Vrai si la grille respecte 5 + 2 numéros distincts, triés et dans les bornes.
    pub fn is_well_formed(&self) -> bool {
        zone_is_well_formed(&self.front, Zone::Front) && zone_is_well_formed(&self.back, Zone::Back)
    }
}

pub fn zone_is_well_formed(numbers: &[u8], zone: Zone) -> bool {
    numbers.len() == zone.pick_count()
        && numbers.iter().all(|&n| zone.contains(n))
        && numbers.windows(2).all(|w| w[0] < w[1])
}

/// Indices de groupes (1..=13) exclus de la génération et du calcul des gains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockSet(BTreeSet<u8>);

impl BlockSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, group: u8) -> bool {
        self.0.contains(&group)
    }

    /// Les indices hors 1..=13 sont ignorés.
    pub fn insert(&mut self, group: u8) -> bool {
        if (1..=GROUP_COUNT).contains(&group) {
            self.0.insert(group)
        } else {
            false
        }
    }

    pub fn remove(&mut self, group: u8) -> bool {
        self.0.remove(&group)
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<u8> for BlockSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = BlockSet::new();
        for g in iter {
            set.insert(g);
        }
        set
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrizeTier {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    Seventh,
    Eighth,
    Ninth,
    NoPrize,
}

impl PrizeTier {
    pub fn level(&self) -> u8 {
        match self {
            PrizeTier::First => 1,
            PrizeTier::Second => 2,
            PrizeTier::Third => 3,
            PrizeTier::Fourth => 4,
            PrizeTier::Fifth => 5,
            PrizeTier::Sixth => 6,
            PrizeTier::Seventh => 7,
            PrizeTier::Eighth => 8,
            PrizeTier::Ninth => 9,
            PrizeTier::NoPrize => 0,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(PrizeTier::NoPrize),
            1 => Some(PrizeTier::First),
            2 => Some(PrizeTier::Second),
            3 => Some(PrizeTier::Third),
            4 => Some(PrizeTier::Fourth),
            5 => Some(PrizeTier::Fifth),
            6 => Some(PrizeTier::Sixth),
            7 => Some(PrizeTier::Seventh),
            8 => Some(PrizeTier::Eighth),
            9 => Some(PrizeTier::Ninth),
            _ => None,
        }
    }

    pub fn is_prize(&self) -> bool {
        *self != PrizeTier::NoPrize
    }
}

impl std::fmt::Display for PrizeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrizeTier::NoPrize => write!(f, "Perdu"),
            tier => write!(f, "Rang {}", tier.level()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrizeRecord {
    pub issue_id: String,
    pub tier: PrizeTier,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupScore {
    pub score: i64,
    pub best_tier: Option<PrizeTier>,
    pub best_tier_count: u32,
    pub history: Vec<PrizeRecord>,
}

/// Scores cumulés, index 0 = groupe 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBoard {
    pub groups: Vec<GroupScore>,
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self {
            groups: vec![GroupScore::default(); GROUP_COUNT as usize],
        }
    }
}

impl ScoreBoard {
    pub fn group(&self, group: u8) -> Option<&GroupScore> {
        self.groups.get((group as usize).checked_sub(1)?)
    }

    pub fn group_mut(&mut self, group: u8) -> Option<&mut GroupScore> {
        self.groups.get_mut((group as usize).checked_sub(1)?)
    }

    pub fn total(&self) -> i64 {
        self.groups.iter().map(|g| g.score).sum()
    }
}

/// Nombre de générations conservées ; les plus anciennes sont évincées.
pub const MAX_GENERATION_RECORDS: usize = 20;

/// Une génération enregistrée : horodatage et texte rendu des 13 groupes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRecord {
    pub id: i64,
    pub created_at: String,
    pub text: String,
}

pub fn validate_draw(front: &[u8; 5], back: &[u8; 2]) -> Result<()> {
    for &n in front {
        if !Zone::Front.contains(n) {
            bail!("Numéro avant {} hors limites (1-35)", n);
        }
    }
    for &n in back {
        if !Zone::Back.contains(n) {
            bail!("Numéro arrière {} hors limites (1-12)", n);
        }
    }
    for i in 0..front.len() {
        for j in (i + 1)..front.len() {
            if front[i] == front[j] {
                bail!("Numéro avant en double : {}", front[i]);
            }
        }
    }
    if back[0] == back[1] {
        bail!("Numéro arrière en double : {}", back[0]);
    }
    Ok(())
}
