use std::path::PathBuf;

use clap::Parser;
use engine::prelude::*;

/// Headless driver, runs a scenario and narrates it to stdout.
#[derive(Parser, Debug)]
struct Args {
    /// Map file to load instead of the built-in demo scenario.
    #[arg(long)]
    map: Option<PathBuf>,

    /// Number of scheduler events to run before giving up.
    #[arg(long, default_value_t = 1000)]
    events: u32,
}

// Every monster starts inside the player's sight radius so the whole mob
// converges on the autopilot from the first turn.
const DEMO_MAP: &str = "
##################
#................#
#...o........o...#
#................#
#....!......?....#
#.......@........#
#....,......!....#
#................#
#...T........T...#
#................#
##################";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let spec = match &args.map {
        Some(path) => WorldSpec::new(std::fs::read_to_string(path)?),
        None => WorldSpec::new(DEMO_MAP),
    };
    log::info!("map size: {}", spec.dim());

    let messages = Receiver::default();
    let mut game = Runtime::new(&spec)?;
    let mut input = Autopilot;

    let mut status = game.scenario_status();
    for _ in 0..args.events {
        if !matches!(status, ScenarioStatus::Ongoing) {
            break;
        }
        game.invoke_next(&mut input);
        status = game.scenario_status();
    }

    for line in messages.try_iter() {
        println!("{line}");
    }

    match status {
        ScenarioStatus::Won => println!("\nThe dungeon falls silent."),
        ScenarioStatus::Lost => println!("\nGame over."),
        ScenarioStatus::Ongoing => {
            println!("\nTime's up after {} events.", args.events)
        }
    }

    println!("{}", render(&game, spec.dim()));
    Ok(())
}

/// Stand-in player brain so the demo plays itself.
///
/// Fights anything adjacent, quaffs when badly hurt, grabs loot it stands
/// on, otherwise waits for the dungeon to come to it.
struct Autopilot;

impl InputSource for Autopilot {
    fn next_command(&mut self, r: &Runtime, player: Entity) -> Action {
        let Some(loc) = player.loc(r) else {
            return Action::Move(IVec2::ZERO);
        };

        if let Some(target) =
            loc.neighbors().find(|&n| r.fighter_at(n).is_some())
        {
            return Action::Attack(target);
        }

        if player.hp(r) * 2 < player.max_hp(r) {
            if let Some(potion) =
                player.contents(r).find(|e| e.is_drinkable(r))
            {
                return Action::Drink(potion);
            }
        }

        if r.items_at(loc).next().is_some() && !player.pack_is_full(r) {
            return Action::Pickup;
        }

        Action::Move(IVec2::ZERO)
    }
}

/// Draw the explored part of the map as one text frame.
fn render(r: &Runtime, dim: IVec2) -> String {
    let mut out = String::new();
    for y in 0..dim.y {
        for x in 0..dim.x {
            let loc = Location::new(x, y);
            let c = if !r.fov().is_explored(loc) {
                ' '
            } else if let Some(mob) = r.fighter_at(loc) {
                mob.icon(r)
            } else if let Some(item) = r.items_at(loc).next() {
                item.icon(r)
            } else {
                char::from(r.tile(loc))
            };
            out.push(c);
        }
        out.push('\n');
    }
    out
}
