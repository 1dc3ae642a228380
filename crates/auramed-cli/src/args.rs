//! `auramed triage` argument parsing.

use anyhow::{anyhow, bail, Context};
use auramed_core::{PatientVitals, VitalsInput};

#[derive(Debug, Clone)]
pub struct TriageArgs {
    pub audio: String,
    pub vitals: VitalsInput,
    pub json: bool,
}

fn parse_number(flag: &str, value: Option<&String>) -> anyhow::Result<i64> {
    let raw = value.ok_or_else(|| anyhow!("{} requires a value", flag))?;
    raw.parse::<i64>()
        .with_context(|| format!("{} expects an integer, got '{}'", flag, raw))
}

/// Parse everything after `triage`.
pub fn parse_triage(args: &[String]) -> anyhow::Result<TriageArgs> {
    let mut audio: Option<String> = None;
    let mut age: Option<i64> = None;
    let mut rate: Option<i64> = None;
    let mut vitals = VitalsInput::default();
    let mut json = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--age" => age = Some(parse_number("--age", iter.next())?),
            "--rate" => rate = Some(parse_number("--rate", iter.next())?),
            "--danger-signs" => vitals.danger_signs = true,
            "--unable-to-drink" => vitals.unable_to_drink = true,
            "--vomits-everything" => vitals.vomits_everything = true,
            "--convulsions" => vitals.convulsions = true,
            "--lethargic" => vitals.lethargic = true,
            "--json" => json = true,
            flag if flag.starts_with("--") => bail!("Unknown flag: {}", flag),
            positional => {
                if audio.is_some() {
                    bail!("Unexpected argument: {}", positional);
                }
                audio = Some(positional.to_string());
            }
        }
    }

    vitals.age_months = age.ok_or_else(|| anyhow!("--age is required"))?;
    vitals.respiratory_rate = rate.ok_or_else(|| anyhow!("--rate is required"))?;

    Ok(TriageArgs {
        audio: audio.unwrap_or_default(),
        vitals,
        json,
    })
}

impl TriageArgs {
    pub fn patient(&self) -> auramed_core::Result<PatientVitals> {
        self.vitals.validate()
    }
}
