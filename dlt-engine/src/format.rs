//! Rendu texte des grilles et relecture.
//!
//! Le texte produit ici est aussi celui qui est enregistré à la confirmation
//! puis relu au calcul des gains : la grammaire d'une ligne est donc un format
//! d'échange, versionné par [`GRAMMAR_VERSION`].

use anyhow::{Result, bail};

use dlt_db::models::{GroupResult, Zone, zone_is_well_formed};

pub const GRAMMAR_VERSION: u32 = 1;

pub const INSUFFICIENT_DATA_TEXT: &str = "No usable draw data: store at least one unblocked draw first.";

const BLOCKED_SUFFIX: &str = "[blocked] no numbers generated";

fn join(numbers: &[u8]) -> String {
    numbers.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(", ")
}

/// Une ligne, sans le saut de ligne final.
pub fn render_line(index: usize, group: &GroupResult) -> String {
    if group.is_empty() {
        format!("Group {index}: {BLOCKED_SUFFIX}")
    } else {
        format!("Group {index}: front[{}] back[{}]", join(&group.front), join(&group.back))
    }
}

/// Les groupes numérotés à partir de 1, une ligne terminée par `\n` chacun.
pub fn render(groups: &[GroupResult]) -> String {
    groups
        .iter()
        .enumerate()
        .map(|(i, g)| render_line(i + 1, g) + "\n")
        .collect()
}

fn parse_list(text: &str, label: &str) -> Option<Vec<u8>> {
    let inner = text.trim().strip_prefix(label)?.strip_prefix('[')?.strip_suffix(']')?;
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    inner.split(',').map(|s| s.trim().parse::<u8>().ok()).collect()
}

enum Line {
    Blocked,
    Numbers(Vec<u8>, Vec<u8>),
}

fn parse_line(line: &str) -> Option<(usize, Line)> {
    let rest = line.trim().strip_prefix("Group ")?;
    let (index, body) = rest.split_once(':')?;
    let index: usize = index.trim().parse().ok()?;
    let body = body.trim();

    if body == BLOCKED_SUFFIX {
        return Some((index, Line::Blocked));
    }
    let split = body.find("back[")?;
    let front = parse_list(&body[..split], "front")?;
    let back = parse_list(&body[split..], "back")?;
    Some((index, Line::Numbers(front, back)))
}

/// Relit un texte produit par [`render`].
///
/// Les lignes étrangères à la grammaire sont ignorées. Une ligne de grille
/// hors séquence (1, 2, 3...) ou dont les numéros ne forment pas 5 + 2
/// valides est une erreur.
pub fn parse_display(text: &str) -> Result<Vec<GroupResult>> {
    let mut groups = Vec::new();
    for line in text.lines() {
        let Some((index, parsed)) = parse_line(line) else {
            continue;
        };
        if index != groups.len() + 1 {
            bail!("Groupe {index} inattendu, groupe {} attendu : {}", groups.len() + 1, line.trim());
        }
        match parsed {
            Line::Blocked => groups.push(GroupResult::empty()),
            Line::Numbers(front, back) => {
                let group = GroupResult::new(front, back);
                if !zone_is_well_formed(&group.front, Zone::Front) || !zone_is_well_formed(&group.back, Zone::Back) {
                    bail!("Groupe {index} mal formé : {}", line.trim());
                }
                groups.push(group);
            }
        }
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_groups() -> Vec<GroupResult> {
        (0..13u8)
            .map(|i| {
                if i == 4 {
                    GroupResult::empty()
                } else {
                    GroupResult::new(vec![i + 1, i + 3, i + 10, i + 20, i + 22], vec![i % 11 + 1, 12])
                }
            })
            .collect()
    }

    #[test]
    fn test_render_line_grammar() {
        let g = GroupResult::new(vec![3, 9, 17, 25, 33], vec![4, 11]);
        assert_eq!(render_line(2, &g), "Group 2: front[3, 9, 17, 25, 33] back[4, 11]");
        assert_eq!(render_line(7, &GroupResult::empty()), "Group 7: [blocked] no numbers generated");
    }

    #[test]
    fn test_render_parse_roundtrip() {
        let groups = sample_groups();
        let text = render(&groups);
        assert_eq!(text.lines().count(), 13);
        assert!(text.ends_with('\n'));
        assert_eq!(parse_display(&text).unwrap(), groups);
    }

    #[test]
    fn test_parse_skips_foreign_lines() {
        let text = "Tirage du jour\nGroup 1: front[1, 2, 3, 4, 5] back[1, 2]\n\nfin\n";
        let groups = parse_display(text).unwrap();
        assert_eq!(groups, vec![GroupResult::new(vec![1, 2, 3, 4, 5], vec![1, 2])]);
    }

    #[test]
    fn test_parse_rejects_short_group() {
        let text = "Group 1: front[1, 2, 3, 4] back[1, 2]\n";
        assert!(parse_display(text).is_err());
        let text = "Group 1: front[1, 2, 3, 4, 40] back[1, 2]\n";
        assert!(parse_display(text).is_err());
        let text = "Group 1: front[1, 2, 3, 4, 5] back[]\n";
        assert!(parse_display(text).is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_sequence_index() {
        let swapped = "Group 2: front[1, 2, 3, 4, 5] back[1, 2]\nGroup 1: front[6, 7, 8, 9, 10] back[3, 4]\n";
        assert!(parse_display(swapped).is_err());

        let repeated = "Group 1: front[1, 2, 3, 4, 5] back[1, 2]\nGroup 1: [blocked] no numbers generated\n";
        assert!(parse_display(repeated).is_err());

        let skipped = "Group 1: front[1, 2, 3, 4, 5] back[1, 2]\nGroup 3: front[6, 7, 8, 9, 10] back[3, 4]\n";
        assert!(parse_display(skipped).is_err());
    }

    #[test]
    fn test_sentinel_parses_to_nothing() {
        assert!(parse_display(INSUFFICIENT_DATA_TEXT).unwrap().is_empty());
    }
}
