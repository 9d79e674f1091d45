use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use noir_case::components::identity::{EntityId, RoleTag};
use noir_case::core::serialization::{dump_truth, save_export_to_path};
use noir_case::data::config::{load_investigation_config, InvestigationConfig};
use noir_case::simulation::case::CaseBlueprint;
use noir_case::simulation::evidence::EvidenceItem;
use noir_case::simulation::investigation::ClaimTag;
use noir_case::simulation::time::format_hour;
use noir_case::systems::actions::ActionResult;
use noir_case::systems::outcome::WorldStanding;
use noir_case::{ActionIntent, CaseSession, CaseSetup};

const COMMANDS: &str = "Commands: status | evidence | leads | people | visit | interview [n] | cctv | forensics | hypothesis <person_n> <claim,claim> <evidence_n...> | assess | preview | arrest [person_n] | dump | export <path> | next [seed] | quit";

struct Args {
    seed: u64,
    config_path: Option<PathBuf>,
    dump: bool,
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("noir_case=info")),
        )
        .with_target(false)
        .init();

    let args = parse_args(env::args().collect());
    let config = match &args.config_path {
        Some(path) => match load_investigation_config(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Failed to load config: {}", err);
                std::process::exit(1);
            }
        },
        None => InvestigationConfig::default(),
    };

    let setup = CaseSetup {
        config,
        blueprint: CaseBlueprint::default(),
        standing: WorldStanding::default(),
    };
    let mut session = match CaseSession::start(args.seed, setup) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("Failed to generate case: {}", err);
            std::process::exit(1);
        }
    };

    if args.json {
        match session.export().to_json() {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("Failed to serialize case: {}", err);
                std::process::exit(1);
            }
        }
        return;
    }
    if args.dump {
        println!("{}", dump_truth(session.truth()));
        return;
    }

    print_briefing(&session);
    println!("{}", COMMANDS);
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or("").to_lowercase();
        let facts = session.facts().clone();

        let intent = match cmd.as_str() {
            "quit" | "exit" => break,
            "help" => {
                println!("{}", COMMANDS);
                continue;
            }
            "status" => {
                print_status(&session);
                continue;
            }
            "evidence" => {
                print_evidence(&session.snapshot().known_evidence);
                continue;
            }
            "leads" => {
                for lead in &session.state().leads.leads {
                    println!(
                        "- {} ({}): deadline t{} [{:?}]",
                        lead.label, lead.action_hint, lead.deadline, lead.status
                    );
                }
                continue;
            }
            "people" => {
                print_people(&session);
                continue;
            }
            "assess" => {
                for line in session.assess_arrest().explanation {
                    println!("{}", line);
                }
                continue;
            }
            "preview" => {
                let validation = session.preview_validation();
                println!("{} [{}]", validation.summary, validation.tier);
                for line in &validation.supports {
                    println!("  + {}", line);
                }
                for line in &validation.missing {
                    println!("  - {}", line);
                }
                continue;
            }
            "dump" => {
                println!("{}", dump_truth(session.truth()));
                continue;
            }
            "export" => {
                let Some(path) = parts.next() else {
                    println!("Usage: export <path>");
                    continue;
                };
                match save_export_to_path(&session.export(), path) {
                    Ok(()) => println!("Case exported to {}", path),
                    Err(err) => println!("Export failed: {}", err),
                }
                continue;
            }
            "next" => {
                let seed = parts
                    .next()
                    .and_then(|raw| raw.parse().ok())
                    .unwrap_or(session.seed().wrapping_add(1));
                match session.next_case(seed, CaseBlueprint::default()) {
                    Ok(next) => {
                        session = next;
                        print_briefing(&session);
                    }
                    Err(err) => println!("Failed to generate case: {}", err),
                }
                continue;
            }
            "visit" => ActionIntent::VisitScene {
                location_id: facts.crime_scene_id,
            },
            "interview" => {
                let person_id = match parts.next() {
                    Some(raw) => match person_at(&session, raw) {
                        Some(id) => id,
                        None => {
                            println!("Unknown person: {}", raw);
                            continue;
                        }
                    },
                    None => facts.witness_id,
                };
                ActionIntent::Interview {
                    person_id,
                    location_id: facts.crime_scene_id,
                }
            }
            "cctv" => ActionIntent::RequestCctv {
                location_id: facts.crime_scene_id,
            },
            "forensics" => ActionIntent::SubmitForensics {
                location_id: facts.crime_scene_id,
                item_id: Some(facts.weapon_id),
            },
            "hypothesis" => {
                let (Some(person_raw), Some(claims_raw)) = (parts.next(), parts.next()) else {
                    println!("Usage: hypothesis <person_n> <claim,claim> <evidence_n...>");
                    continue;
                };
                let Some(suspect_id) = person_at(&session, person_raw) else {
                    println!("Unknown person: {}", person_raw);
                    continue;
                };
                let claims: Vec<ClaimTag> = claims_raw.split(',').filter_map(ClaimTag::parse).collect();
                let known = session.snapshot().known_evidence;
                let evidence_ids = parts
                    .filter_map(|raw| raw.parse::<usize>().ok())
                    .filter_map(|n| known.get(n.checked_sub(1)?).map(|item| item.id))
                    .collect();
                ActionIntent::SetHypothesis {
                    suspect_id,
                    claims,
                    evidence_ids,
                }
            }
            "arrest" => {
                let person_id = parts
                    .next()
                    .and_then(|raw| person_at(&session, raw))
                    .or_else(|| session.board().hypothesis.as_ref().map(|h| h.suspect_id));
                let Some(person_id) = person_id else {
                    println!("Usage: arrest <person_n>");
                    continue;
                };
                ActionIntent::Arrest {
                    person_id,
                    location_id: facts.crime_scene_id,
                }
            }
            _ => {
                println!("Unknown command: {}", cmd);
                continue;
            }
        };

        match session.act(intent) {
            Ok(result) => print_result(&result),
            Err(err) => println!("Action aborted: {}", err),
        }
        if let Some(verdict) = session.verdict() {
            println!("Verdict: {}", verdict.validation.summary);
            for line in &verdict.validation.supports {
                println!("  + {}", line);
            }
            for line in &verdict.validation.missing {
                println!("  - {}", line);
            }
            for line in verdict.validation.notes.iter().chain(&verdict.outcome.notes) {
                println!("  * {}", line);
            }
            let standing = session.standing();
            println!(
                "Outcome: {} (trust {}, pressure {})",
                verdict.outcome.arrest_result, standing.trust, standing.pressure
            );
        }
    }
}

fn parse_args(args: Vec<String>) -> Args {
    let mut iter = args.iter();
    let mut parsed = Args {
        seed: 1,
        config_path: None,
        dump: false,
        json: false,
    };
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seed" => {
                if let Some(value) = iter.next() {
                    match value.parse() {
                        Ok(seed) => parsed.seed = seed,
                        Err(_) => eprintln!("Ignoring invalid seed: {}", value),
                    }
                }
            }
            "--config" => {
                if let Some(value) = iter.next() {
                    parsed.config_path = Some(PathBuf::from(value));
                }
            }
            "--dump" => parsed.dump = true,
            "--json" => parsed.json = true,
            _ => {}
        }
    }
    parsed
}

/// 1-based index into the case's people.
fn person_at(session: &CaseSession, raw: &str) -> Option<EntityId> {
    let index = raw.parse::<usize>().ok()?.checked_sub(1)?;
    session.truth().people().get(index).map(|person| person.id)
}

fn print_briefing(session: &CaseSession) {
    let facts = session.facts();
    let truth = session.truth();
    let scene = truth
        .location(facts.crime_scene_id)
        .map(|location| format!("{} ({})", location.name, location.district))
        .unwrap_or_else(|| "unknown scene".to_string());
    let victim = truth
        .person(facts.victim_id)
        .map(|person| person.name.as_str())
        .unwrap_or("unknown");
    println!("Case {}: {} found dead at {}.", facts.case_id, victim, scene);
    println!("Reported around {}.", format_hour(facts.crime_time + 2));
    print_status(session);
}

fn print_status(session: &CaseSession) {
    let snapshot = session.snapshot();
    println!(
        "Time {}/{} | Pressure {}/{} | Trust {} | Cooperation {:.2}",
        snapshot.time,
        snapshot.time_limit,
        snapshot.pressure,
        snapshot.pressure_limit,
        snapshot.trust,
        snapshot.cooperation
    );
}

fn print_people(session: &CaseSession) {
    for (index, person) in session.truth().people().iter().enumerate() {
        let public_roles: Vec<&str> = person
            .roles
            .iter()
            .filter(|role| **role != RoleTag::Offender)
            .map(|role| role.as_str())
            .collect();
        println!("{}. {} [{}]", index + 1, person.name, public_roles.join(", "));
    }
}

fn print_evidence(items: &[EvidenceItem]) {
    if items.is_empty() {
        println!("No evidence collected.");
        return;
    }
    for (index, item) in items.iter().enumerate() {
        let window = item
            .time_window()
            .map(|window| format!(" {}-{}", format_hour(window.start), format_hour(window.end)))
            .unwrap_or_default();
        println!(
            "{}. [{}] {} from {} ({}){}",
            index + 1,
            item.class(),
            item.summary,
            item.source,
            item.confidence,
            window
        );
    }
}

fn print_result(result: &ActionResult) {
    println!(
        "{}: {} (+{}t, +{}p)",
        result.action, result.summary, result.time_cost, result.pressure_cost
    );
    for item in &result.revealed {
        println!("  new evidence: {} ({})", item.summary, item.confidence);
    }
    for note in &result.notes {
        println!("  note: {}", note);
    }
}
