//! `kickoff catalog`
//!
//! Prints the event categories with their candidate responses, and the
//! response table with risk and reward.

use serde_json::{Value, json};

use crate::cli::args::{CatalogArgs, OutputFormat};
use crate::error::KickoffError;
use crate::tactics::{EventKind, TacticalResponse};

/// # Errors
///
/// Returns `KickoffError::Json` if the JSON rendering fails.
pub fn run(args: &CatalogArgs) -> Result<(), KickoffError> {
    match args.format {
        OutputFormat::Human => print!("{}", render_human()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&render_json())?),
    }
    Ok(())
}

fn render_human() -> String {
    let mut out = String::from("EVENTS\n");
    for kind in EventKind::ALL {
        let marker = if EventKind::SPONTANEOUS.contains(&kind) { "*" } else { " " };
        let candidates: Vec<_> = kind.candidates().iter().map(|r| r.as_str()).collect();
        out.push_str(&format!("{marker} {:<16} {}\n", kind.as_str(), kind.prompt()));
        out.push_str(&format!("  {:<16} -> {}\n", "", candidates.join(", ")));
    }
    out.push_str("  (* raised spontaneously by default)\n\nRESPONSES\n");
    for response in TacticalResponse::ALL {
        out.push_str(&format!(
            "  {:<17} {:<18} {:<7} {:>3}\n",
            response.as_str(),
            response.label(),
            response.risk().as_str(),
            response.reward()
        ));
    }
    out
}

fn render_json() -> Value {
    let events: Vec<_> = EventKind::ALL
        .into_iter()
        .map(|kind| {
            json!({
                "kind": kind,
                "prompt": kind.prompt(),
                "candidates": kind.candidates(),
                "spontaneous": EventKind::SPONTANEOUS.contains(&kind),
            })
        })
        .collect();
    let responses: Vec<_> = TacticalResponse::ALL
        .into_iter()
        .map(|r| {
            json!({
                "response": r,
                "label": r.label(),
                "risk": r.risk(),
                "reward": r.reward(),
            })
        })
        .collect();
    json!({ "events": events, "responses": responses })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_lists_every_entry() {
        let out = render_human();
        for kind in EventKind::ALL {
            assert!(out.contains(kind.as_str()), "missing {kind}");
        }
        for response in TacticalResponse::ALL {
            assert!(out.contains(response.label()), "missing {response}");
        }
        assert!(out.contains("* FOUL_HOME"));
        assert!(out.contains("  PENALTY"));
    }

    #[test]
    fn test_json_shape() {
        let value = render_json();
        let events = value["events"].as_array().unwrap();
        assert_eq!(events.len(), 12);
        assert_eq!(events[0]["kind"], "FOUL_HOME");
        assert_eq!(events[0]["candidates"][0], "QUICK_FREE_KICK");
        assert_eq!(events[0]["spontaneous"], true);

        let responses = value["responses"].as_array().unwrap();
        assert_eq!(responses.len(), 10);
        let qfk = responses.iter().find(|r| r["response"] == "QUICK_FREE_KICK").unwrap();
        assert_eq!(qfk["risk"], "high");
        assert_eq!(qfk["reward"], 35);
    }
}
