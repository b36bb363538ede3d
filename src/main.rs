//! Colonial Rules - command line driver
//!
//! Loads a rules file and exercises the two rule consumers: the monarch
//! action selector over a run of turns, and build queue production
//! resolution for a given queue and goods on hand.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use colonial_rules::city::{AbstractGoods, BuildQueue, ProductionStatus};
use colonial_rules::core::error::{Result, RulesError};
use colonial_rules::core::{Difficulty, GameRng, Id, PlayerId, Turn};
use colonial_rules::monarch::{
    Contact, Monarch, MonarchAction, MonarchContext, MonarchOutcome, PlayerState, Stance,
};
use colonial_rules::rules::RuleSet;

#[derive(Parser, Debug)]
#[command(name = "colonial-rules")]
#[command(about = "Feature engine, build queue and monarch rules for a colonial strategy game")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate monarch actions against one colonial player
    Monarch {
        /// Rules file
        #[arg(long, default_value = "data/rules.toml")]
        rules: PathBuf,

        /// Random seed for deterministic runs
        #[arg(long)]
        seed: Option<u64>,

        /// Number of turns to simulate
        #[arg(long, default_value_t = 100)]
        turns: u32,

        /// Difficulty tier (0-4)
        #[arg(long, default_value_t = 2)]
        difficulty: u8,

        /// Starting gold of the player
        #[arg(long, default_value_t = 1000)]
        gold: u32,

        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,
    },

    /// Resolve what a build queue would consume
    Build {
        /// Rules file
        #[arg(long, default_value = "data/rules.toml")]
        rules: PathBuf,

        /// Comma separated buildable ids, head first
        #[arg(long)]
        queue: String,

        /// Comma separated goods=amount pairs
        #[arg(long, default_value = "")]
        available: String,
    },
}

/// One turn of a monarch run
#[derive(Serialize)]
struct TurnReport {
    turn: Turn,
    action: MonarchAction,
    outcome: MonarchOutcome,
}

#[derive(Serialize)]
struct MonarchReport {
    seed: u64,
    difficulty: Difficulty,
    turns: Vec<TurnReport>,
    final_tax: u32,
    final_ref: [u32; 4],
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "colonial_rules=info".into()),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Command::Monarch {
            rules,
            seed,
            turns,
            difficulty,
            gold,
            json,
        } => {
            let rules = RuleSet::load_from_toml(&rules)?;
            let seed = seed.unwrap_or_else(rand::random);
            let report = run_monarch(&rules, seed, turns, Difficulty::new(difficulty)?, gold);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_monarch_report(&report);
            }
        }
        Command::Build {
            rules,
            queue,
            available,
        } => {
            let rules = RuleSet::load_from_toml(&rules)?;
            run_build(&rules, &queue, &available)?;
        }
    }
    Ok(())
}

fn run_monarch(
    rules: &RuleSet,
    seed: u64,
    turns: u32,
    difficulty: Difficulty,
    gold: u32,
) -> MonarchReport {
    let mut rng = GameRng::seed_from_u64(seed);
    let mut player = PlayerState::new(PlayerId(1), difficulty);
    player.gold = gold;
    player.settlements = 1;
    player.contacts = vec![
        Contact::european(PlayerId(2), Stance::Peace),
        Contact::european(PlayerId(3), Stance::Peace),
        Contact::native(PlayerId(4), Stance::Peace),
    ];
    let mut monarch = Monarch::new(player.id, rules.monarch_config());

    let mut reports = Vec::new();
    for number in 0..turns {
        let turn = Turn(number);
        let action = monarch.get_action(&MonarchContext::new(turn, &player, rules), &mut rng);
        if action == MonarchAction::NoAction {
            continue;
        }
        let outcome = monarch.apply_action(action, turn, &mut player, rules, &mut rng);
        reports.push(TurnReport { turn, action, outcome });
    }

    MonarchReport {
        seed,
        difficulty,
        turns: reports,
        final_tax: player.tax,
        final_ref: monarch.expeditionary_force().counts(),
    }
}

fn print_monarch_report(report: &MonarchReport) {
    println!("=== MONARCH (seed {}, difficulty {}) ===", report.seed, report.difficulty.tier());
    for entry in &report.turns {
        println!("turn {:>4}  {:<18} {:?}", entry.turn, entry.action.to_string(), entry.outcome);
    }
    println!();
    println!("Final tax: {}%", report.final_tax);
    let [infantry, dragoons, artillery, men_of_war] = report.final_ref;
    println!(
        "Final REF: {} infantry, {} dragoons, {} artillery, {} men of war",
        infantry, dragoons, artillery, men_of_war
    );
}

fn run_build(rules: &RuleSet, queue: &str, available: &str) -> Result<()> {
    let mut build_queue = BuildQueue::default();
    for id in split_list(queue) {
        let buildable = rules
            .buildable(&Id::new(id))
            .ok_or_else(|| RulesError::UnknownBuildableType(Id::new(id)))?;
        build_queue.add(buildable.clone());
    }
    let available = parse_goods(rules, available)?;

    let status = build_queue.production_status(&available, rules);
    let info = build_queue.get_production_info(&available, rules);
    match (status, build_queue.current_building()) {
        (ProductionStatus::EmptyQueue, _) | (_, None) => println!("Queue is empty"),
        (ProductionStatus::Blocked, Some(current)) => {
            println!("{} is blocked; nothing is consumed", current.id());
            for required in current.required_goods() {
                println!("  needs {} {}", required.amount, required.goods_type);
            }
        }
        (ProductionStatus::Ready, Some(current)) => {
            println!("{} consumes:", current.id());
            for goods in &info.consumption {
                println!("  {} {}", goods.amount, goods.goods_type);
            }
        }
    }
    Ok(())
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_goods(rules: &RuleSet, list: &str) -> Result<Vec<AbstractGoods>> {
    split_list(list)
        .map(|pair| {
            let (id, amount) = pair
                .split_once('=')
                .ok_or_else(|| {
                    RulesError::InvalidConfig(format!("expected goods=amount, got '{}'", pair))
                })?;
            let id = Id::new(id.trim());
            if rules.goods_type(&id).is_none() {
                return Err(RulesError::UnknownGoodsType(id));
            }
            let amount = amount
                .trim()
                .parse()
                .map_err(|_| RulesError::InvalidConfig(format!("bad amount in '{}'", pair)))?;
            Ok(AbstractGoods::new(id, amount))
        })
        .collect()
}
