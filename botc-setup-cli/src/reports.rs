use anyhow::Result;
use botc_setup::{
    Catalog, CatalogError, CharacterId, CharacterInfo, Distribution, RoleType, Session,
    night_order,
};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub id: CharacterId,
    pub name: String,
    pub role_type: RoleType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ReportEntry {
    fn character(info: &CharacterInfo) -> Self {
        Self {
            id: info.id.clone(),
            name: info.name.clone(),
            role_type: info.role_type,
            details: None,
        }
    }

    fn night_step(info: &CharacterInfo, first_night: bool) -> Self {
        Self {
            details: info
                .night_details(first_night)
                .map(|action| action.details.clone()),
            ..Self::character(info)
        }
    }
}

/// Everything printed for one run of the setup tool.
#[derive(Debug, Clone, Serialize)]
pub struct SetupReport {
    pub script_id: String,
    pub title: String,
    pub seed: u64,
    pub num_players: usize,
    pub base: Distribution,
    pub targets: Vec<Distribution>,
    pub actual: Distribution,
    pub effective: Distribution,
    pub done: Vec<RoleType>,
    pub complete: bool,
    pub bag: Vec<ReportEntry>,
    pub not_in_bag: Vec<ReportEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_night: Option<Vec<ReportEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_nights: Option<Vec<ReportEntry>>,
}

impl SetupReport {
    /// Summarize a session, optionally with the night order for the characters in play.
    ///
    /// # Errors
    ///
    /// Returns an error if a selected character is missing from the catalog.
    pub fn build(
        catalog: &Catalog,
        session: &Session,
        seed: u64,
        with_night_order: bool,
    ) -> Result<Self, CatalogError> {
        let summary = session.summary();
        let entries = |ids: &[CharacterId]| -> Result<Vec<ReportEntry>, CatalogError> {
            ids.iter()
                .map(|id| catalog.get(id).map(ReportEntry::character))
                .collect()
        };
        let bag = entries(&summary.bag)?;
        let not_in_bag = entries(&summary.not_in_bag)?;

        let (first_night, other_nights) = if with_night_order {
            let in_play: Vec<CharacterId> = summary
                .bag
                .iter()
                .chain(&summary.not_in_bag)
                .cloned()
                .collect();
            let steps = |first: bool| -> Result<Vec<ReportEntry>, CatalogError> {
                Ok(night_order(catalog, &in_play, first)?
                    .into_iter()
                    .map(|info| ReportEntry::night_step(info, first))
                    .collect())
            };
            (Some(steps(true)?), Some(steps(false)?))
        } else {
            (None, None)
        };

        let script = session.script();
        Ok(Self {
            script_id: script.id.clone(),
            title: script.title.clone(),
            seed,
            num_players: summary.num_players,
            base: summary.base,
            targets: summary.targets.into_iter().collect(),
            actual: summary.actual,
            effective: summary.effective,
            done: summary.done.into_iter().collect(),
            complete: summary.complete,
            bag,
            not_in_bag,
            first_night,
            other_nights,
        })
    }
}

fn role_colored(entry: &ReportEntry) -> ColoredString {
    match entry.role_type {
        RoleType::Townsfolk => entry.name.blue(),
        RoleType::Outsider => entry.name.cyan(),
        RoleType::Minion => entry.name.red(),
        RoleType::Demon => entry.name.bright_red().bold(),
        RoleType::Fabled => entry.name.yellow(),
        RoleType::Traveller => entry.name.magenta(),
    }
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn generate_console_report<W: Write + ?Sized>(out: &mut W, report: &SetupReport) -> Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{} ({} players, seed {})",
        report.title.bright_cyan().bold(),
        report.num_players,
        report.seed
    )?;
    writeln!(out, "{}", "==============================".cyan())?;
    writeln!(out, "Base:      {}", report.base)?;
    writeln!(out, "Targets:   {}", join(&report.targets))?;
    writeln!(
        out,
        "Selected:  {} (effective {})",
        report.actual, report.effective
    )?;
    if !report.done.is_empty() {
        writeln!(out, "Done:      {}", join(&report.done))?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "{} {}/{}",
        "👜 Bag".bold(),
        report.bag.len(),
        report.num_players
    )?;
    for (i, entry) in report.bag.iter().enumerate() {
        writeln!(out, "  {:>2}. {} [{}]", i + 1, role_colored(entry), entry.role_type)?;
    }
    if !report.not_in_bag.is_empty() {
        writeln!(out, "{}", "Not in bag:".bold())?;
        for entry in &report.not_in_bag {
            writeln!(out, "      {} [{}]", role_colored(entry), entry.role_type)?;
        }
    }

    for (label, steps) in [
        ("🌙 First night", &report.first_night),
        ("🌘 Other nights", &report.other_nights),
    ] {
        let Some(steps) = steps else {
            continue;
        };
        writeln!(out)?;
        writeln!(out, "{}", label.bright_yellow().bold())?;
        for entry in steps {
            writeln!(out, "  • {}", role_colored(entry))?;
            if let Some(details) = &entry.details {
                writeln!(out, "    {}", details.dimmed())?;
            }
        }
    }

    writeln!(out)?;
    let status = if report.complete {
        "✅ Bag complete".green()
    } else {
        "⏳ Bag incomplete".yellow()
    };
    writeln!(out, "{status}")?;
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(out: &mut W, report: &SetupReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}
