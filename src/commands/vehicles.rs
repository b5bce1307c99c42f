//! MOTORPOOL - Vehicle Commands
//! Shell commands that read or change the collection.

use std::collections::BTreeMap;

use crate::collection::guard;
use crate::error::{MotorpoolError, Result};
use crate::input::{parse_id, parse_threshold};
use crate::types::{parse_optional, Vehicle, VehicleId, VehiclePatch, VehicleType};

use super::{Command, Context, Invoker, Outcome};

fn single_id(args: &[&str], usage: &str) -> Result<VehicleId> {
    match args {
        [id] => parse_id(id),
        _ => Err(MotorpoolError::InvalidArgument(format!("usage: {}", usage))),
    }
}

fn print_vehicles(ctx: &mut Context, vehicles: &[Vehicle]) -> Result<()> {
    let out = ctx.input.out();
    if vehicles.is_empty() {
        writeln!(out, "  Collection is empty.")?;
    }
    for vehicle in vehicles {
        writeln!(out, "  {}", vehicle)?;
    }
    Ok(())
}

/// `insert`: prompt for every field and add the vehicle.
pub struct Insert;

impl Command for Insert {
    fn description(&self) -> &str {
        "add a new vehicle (prompts for each field)"
    }

    fn execute(&self, _: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        ctx.session.require_user()?;
        let draft = prompt!(ctx.input.prompt_draft());
        let id = ctx.collection.add(draft, &ctx.session)?;
        writeln!(ctx.input.out(), "  Vehicle added with id {}.", id)?;
        Ok(Outcome::Continue)
    }
}

/// `update <id>`: replace every editable field of an owned vehicle.
pub struct Update;

impl Command for Update {
    fn description(&self) -> &str {
        "update <id>: re-enter the fields of your vehicle"
    }

    fn execute(&self, args: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        let id = single_id(args, "update <id>")?;
        let current = ctx.collection.get(id).ok_or(MotorpoolError::NotFound(id))?;
        guard::authorize(current, &ctx.session)?;

        let draft = prompt!(ctx.input.prompt_draft());
        ctx.collection
            .update(id, &VehiclePatch::replace_with(draft), &ctx.session)?;
        writeln!(ctx.input.out(), "  Vehicle {} updated.", id)?;
        Ok(Outcome::Continue)
    }
}

/// `remove_key <id>`
pub struct RemoveKey;

impl Command for RemoveKey {
    fn description(&self) -> &str {
        "remove_key <id>: remove your vehicle by id"
    }

    fn execute(&self, args: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        let id = single_id(args, "remove_key <id>")?;
        let removed = ctx.collection.remove_by_id(id, &ctx.session)?;
        writeln!(ctx.input.out(), "  Removed '{}'.", removed.name)?;
        Ok(Outcome::Continue)
    }
}

/// `remove_lower_key <id>`
pub struct RemoveLowerKey;

impl Command for RemoveLowerKey {
    fn description(&self) -> &str {
        "remove_lower_key <id>: remove your vehicles with a smaller id"
    }

    fn execute(&self, args: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        let threshold = single_id(args, "remove_lower_key <id>")?;
        let removed = ctx.collection.remove_ids_below(threshold, &ctx.session)?;
        writeln!(ctx.input.out(), "  Removed {} vehicles.", removed)?;
        Ok(Outcome::Continue)
    }
}

/// `remove_greater [threshold]`: prompts when no threshold is given.
pub struct RemoveGreater;

impl Command for RemoveGreater {
    fn description(&self) -> &str {
        "remove_greater [power]: remove your vehicles with more engine power"
    }

    fn execute(&self, args: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        ctx.session.require_user()?;
        let threshold = match args {
            [] => prompt!(ctx.input.prompt_threshold()),
            [value] => parse_threshold(value)?,
            _ => {
                return Err(MotorpoolError::InvalidArgument(
                    "usage: remove_greater [power]".to_string(),
                ))
            }
        };
        let removed = ctx
            .collection
            .remove_where_engine_power_greater_than(threshold, &ctx.session)?;
        writeln!(ctx.input.out(), "  Removed {} vehicles.", removed)?;
        Ok(Outcome::Continue)
    }
}

/// `remove_all_by_type [type|null]`: no argument means vehicles without a type.
pub struct RemoveAllByType;

impl Command for RemoveAllByType {
    fn description(&self) -> &str {
        "remove_all_by_type [type|null]: remove your vehicles of one type"
    }

    fn execute(&self, args: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        let vehicle_type = match args {
            [] => None,
            [value] => parse_optional::<VehicleType>(value)?,
            _ => {
                return Err(MotorpoolError::InvalidArgument(
                    "usage: remove_all_by_type [type|null]".to_string(),
                ))
            }
        };
        let removed = ctx.collection.remove_where_type(vehicle_type, &ctx.session)?;
        writeln!(ctx.input.out(), "  Removed {} vehicles.", removed)?;
        Ok(Outcome::Continue)
    }
}

/// `clear`: remove every vehicle the session user owns.
pub struct Clear;

impl Command for Clear {
    fn description(&self) -> &str {
        "remove all of your vehicles"
    }

    fn execute(&self, _: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        let user = ctx.session.require_user()?;
        let removed = ctx.collection.clear_owned_by(user);
        writeln!(ctx.input.out(), "  Removed {} vehicles.", removed)?;
        Ok(Outcome::Continue)
    }
}

/// `show [id|name|power|created]`
pub struct Show;

impl Command for Show {
    fn description(&self) -> &str {
        "show [id|name|power|created]: list vehicles, optionally sorted"
    }

    fn execute(&self, args: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        let all = |_: &Vehicle| true;
        let vehicles = match args {
            [] | ["id"] => ctx.collection.list(),
            ["name"] => ctx.collection.filter_and_sort(all, |a, b| a.name.cmp(&b.name)),
            ["power"] => ctx
                .collection
                .filter_and_sort(all, |a, b| a.engine_power.total_cmp(&b.engine_power)),
            ["created"] => ctx
                .collection
                .filter_and_sort(all, |a, b| a.created_at.cmp(&b.created_at)),
            _ => {
                return Err(MotorpoolError::InvalidArgument(
                    "usage: show [id|name|power|created]".to_string(),
                ))
            }
        };
        print_vehicles(ctx, &vehicles)?;
        Ok(Outcome::Continue)
    }
}

/// `info`: collection summary and operation counters.
pub struct Info;

impl Command for Info {
    fn description(&self) -> &str {
        "print information about the collection"
    }

    fn execute(&self, _: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        let owned = match ctx.session.current_user() {
            Some(user) => format!("{} ({})", ctx.collection.count_owned_by(user), user),
            None => "not logged in".to_string(),
        };
        let report = ctx.collection.metrics().report();

        let out = ctx.input.out();
        writeln!(out, "  Collection type:  BTreeMap<u32, Vehicle>")?;
        writeln!(
            out,
            "  Initialized:      {}",
            ctx.collection.initialized_at().format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(out, "  Elements:         {}", ctx.collection.len())?;
        writeln!(out, "  Owned by you:     {}", owned)?;
        for line in report.lines() {
            writeln!(out, "  {}", line)?;
        }
        Ok(Outcome::Continue)
    }
}

/// `print_field_ascending_fuel_type`: fuel type frequencies, rarest first.
pub struct PrintFieldAscendingFuelType;

impl Command for PrintFieldAscendingFuelType {
    fn description(&self) -> &str {
        "count vehicles per fuel type, in ascending order of count"
    }

    fn execute(&self, _: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for vehicle in ctx.collection.list() {
            let label = vehicle.fuel_type.map_or("null", |f| f.as_str());
            *counts.entry(label).or_default() += 1;
        }
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by_key(|&(_, count)| count);

        let out = ctx.input.out();
        if counts.is_empty() {
            writeln!(out, "  Collection is empty.")?;
        }
        for (label, count) in counts {
            writeln!(out, "  {}: {}", label, count)?;
        }
        Ok(Outcome::Continue)
    }
}

/// `group_counting_by_engine_power`: vehicles per distinct engine power.
pub struct GroupCountingByEnginePower;

impl Command for GroupCountingByEnginePower {
    fn description(&self) -> &str {
        "count vehicles per engine power value"
    }

    fn execute(&self, _: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        let vehicles = ctx.collection.filter_and_sort(
            |_| true,
            |a, b| a.engine_power.total_cmp(&b.engine_power),
        );

        let mut groups: Vec<(f32, usize)> = Vec::new();
        for vehicle in &vehicles {
            match groups.last_mut() {
                Some((power, count)) if *power == vehicle.engine_power => *count += 1,
                _ => groups.push((vehicle.engine_power, 1)),
            }
        }

        let out = ctx.input.out();
        if groups.is_empty() {
            writeln!(out, "  Collection is empty.")?;
        }
        for (power, count) in groups {
            writeln!(out, "  {}: {}", power, count)?;
        }
        Ok(Outcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{context, logged_in};
    use crate::session::Session;
    use crate::types::{FuelType, VehicleDraft};

    fn run(command: &dyn Command, args: &[&str], ctx: &mut Context) -> Result<Outcome> {
        let invoker = Invoker::new(8);
        command.execute(args, ctx, &invoker)
    }

    fn seed(ctx: &mut Context, owner: &str, drafts: Vec<VehicleDraft>) {
        let session = Session::logged_in(owner);
        for draft in drafts {
            ctx.collection.add(draft, &session).unwrap();
        }
    }

    #[test]
    fn test_insert_prompts_and_adds() {
        let (mut ctx, transcript) = logged_in("Bus\n10\n20\n99.5\nauto\nplasma\n", "alice");
        assert_eq!(run(&Insert, &[], &mut ctx).unwrap(), Outcome::Continue);

        let vehicle = ctx.collection.get(1).unwrap();
        assert_eq!(vehicle.name, "Bus");
        assert_eq!(vehicle.owner, "alice");
        assert_eq!(vehicle.vehicle_type, Some(VehicleType::Auto));
        assert_eq!(vehicle.fuel_type, Some(FuelType::Plasma));
        assert!(transcript.text().contains("Vehicle added with id 1."));
    }

    #[test]
    fn test_insert_requires_login_before_prompting() {
        let (mut ctx, transcript) = context("Bus\n");
        assert!(matches!(
            run(&Insert, &[], &mut ctx),
            Err(MotorpoolError::Unauthenticated)
        ));
        assert!(!transcript.text().contains("Name"));
    }

    #[test]
    fn test_insert_cancelled_mid_prompt() {
        let (mut ctx, _) = logged_in("Bus\n10\n\\stop_running_command\n", "alice");
        assert_eq!(run(&Insert, &[], &mut ctx).unwrap(), Outcome::Cancelled);
        assert!(ctx.collection.is_empty());
    }

    #[test]
    fn test_update_foreign_vehicle_rejected_before_prompting() {
        let (mut ctx, _) = logged_in("Car\n1\n1\n5\n\n\n", "bob");
        seed(&mut ctx, "alice", vec![VehicleDraft::new("Bus", 1, 1, 10.0)]);

        assert!(matches!(
            run(&Update, &["1"], &mut ctx),
            Err(MotorpoolError::Unauthorized { id: 1, .. })
        ));
        assert_eq!(ctx.collection.get(1).unwrap().name, "Bus");
    }

    #[test]
    fn test_update_replaces_fields() {
        let (mut ctx, _) = logged_in("Car\n1\n2\n5\nboat\n\n", "alice");
        seed(&mut ctx, "alice", vec![VehicleDraft::new("Bus", 1, 1, 10.0)]);
        let created = ctx.collection.get(1).unwrap().created_at;

        run(&Update, &["1"], &mut ctx).unwrap();
        let vehicle = ctx.collection.get(1).unwrap();
        assert_eq!(vehicle.name, "Car");
        assert_eq!(vehicle.coordinates.y, 2);
        assert_eq!(vehicle.vehicle_type, Some(VehicleType::Boat));
        assert_eq!(vehicle.created_at, created);
    }

    #[test]
    fn test_update_usage() {
        let (mut ctx, _) = logged_in("", "alice");
        assert!(matches!(
            run(&Update, &[], &mut ctx),
            Err(MotorpoolError::InvalidArgument(_))
        ));
        assert!(matches!(
            run(&Update, &["7"], &mut ctx),
            Err(MotorpoolError::NotFound(7))
        ));
    }

    #[test]
    fn test_remove_key_reindexes() {
        let (mut ctx, _) = logged_in("", "alice");
        seed(
            &mut ctx,
            "alice",
            (1..=3)
                .map(|i| VehicleDraft::new(format!("v{}", i), 1, 1, i as f32))
                .collect(),
        );

        run(&RemoveKey, &["2"], &mut ctx).unwrap();
        let names: Vec<_> = ctx.collection.list().into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["v1", "v3"]);
        assert_eq!(ctx.collection.get(2).unwrap().name, "v3");
    }

    #[test]
    fn test_remove_lower_key_only_owned() {
        let (mut ctx, transcript) = logged_in("", "alice");
        seed(&mut ctx, "bob", vec![VehicleDraft::new("b", 1, 1, 1.0)]);
        seed(
            &mut ctx,
            "alice",
            vec![
                VehicleDraft::new("a1", 1, 1, 1.0),
                VehicleDraft::new("a2", 1, 1, 1.0),
            ],
        );

        run(&RemoveLowerKey, &["3"], &mut ctx).unwrap();
        let names: Vec<_> = ctx.collection.list().into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["b", "a2"]);
        assert!(transcript.text().contains("Removed 1 vehicles."));
    }

    #[test]
    fn test_remove_greater_prompts_without_argument() {
        let (mut ctx, _) = logged_in("abc\n50\n", "alice");
        seed(
            &mut ctx,
            "alice",
            vec![
                VehicleDraft::new("slow", 1, 1, 10.0),
                VehicleDraft::new("fast", 1, 1, 100.0),
            ],
        );

        run(&RemoveGreater, &[], &mut ctx).unwrap();
        assert_eq!(ctx.collection.len(), 1);
        assert_eq!(ctx.collection.get(1).unwrap().name, "slow");
    }

    #[test]
    fn test_remove_greater_with_argument() {
        let (mut ctx, _) = logged_in("", "alice");
        seed(&mut ctx, "alice", vec![VehicleDraft::new("fast", 1, 1, 100.0)]);
        run(&RemoveGreater, &["99.9"], &mut ctx).unwrap();
        assert!(ctx.collection.is_empty());
    }

    #[test]
    fn test_remove_all_by_type_null() {
        let (mut ctx, _) = logged_in("", "alice");
        seed(
            &mut ctx,
            "alice",
            vec![
                VehicleDraft::new("typed", 1, 1, 1.0).with_type(VehicleType::Boat),
                VehicleDraft::new("untyped", 1, 1, 1.0),
            ],
        );

        run(&RemoveAllByType, &["null"], &mut ctx).unwrap();
        assert_eq!(ctx.collection.len(), 1);
        assert_eq!(ctx.collection.get(1).unwrap().name, "typed");

        run(&RemoveAllByType, &["BOAT"], &mut ctx).unwrap();
        assert!(ctx.collection.is_empty());
    }

    #[test]
    fn test_remove_all_by_type_unknown_type() {
        let (mut ctx, _) = logged_in("", "alice");
        assert!(matches!(
            run(&RemoveAllByType, &["tank"], &mut ctx),
            Err(MotorpoolError::Validation { .. })
        ));
    }

    #[test]
    fn test_clear_scoped_to_user() {
        let (mut ctx, _) = logged_in("", "bob");
        seed(&mut ctx, "alice", vec![VehicleDraft::new("a", 1, 1, 1.0)]);
        seed(&mut ctx, "bob", vec![VehicleDraft::new("b", 1, 1, 1.0)]);
        seed(&mut ctx, "alice", vec![VehicleDraft::new("c", 1, 1, 1.0)]);

        run(&Clear, &[], &mut ctx).unwrap();
        let names: Vec<_> = ctx.collection.list().into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_show_sorted_by_power() {
        let (mut ctx, transcript) = context("");
        seed(
            &mut ctx,
            "alice",
            vec![
                VehicleDraft::new("strong", 1, 1, 300.0),
                VehicleDraft::new("weak", 1, 1, 3.0),
            ],
        );

        run(&Show, &["power"], &mut ctx).unwrap();
        let text = transcript.text();
        let weak = text.find("weak").unwrap();
        let strong = text.find("strong").unwrap();
        assert!(weak < strong);

        assert!(matches!(
            run(&Show, &["colour"], &mut ctx),
            Err(MotorpoolError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_show_empty() {
        let (mut ctx, transcript) = context("");
        run(&Show, &[], &mut ctx).unwrap();
        assert!(transcript.text().contains("Collection is empty."));
    }

    #[test]
    fn test_info_reports_counts() {
        let (mut ctx, transcript) = logged_in("", "alice");
        seed(&mut ctx, "alice", vec![VehicleDraft::new("a", 1, 1, 1.0)]);
        seed(&mut ctx, "bob", vec![VehicleDraft::new("b", 1, 1, 1.0)]);

        run(&Info, &[], &mut ctx).unwrap();
        let text = transcript.text();
        assert!(text.contains("Elements:         2"));
        assert!(text.contains("Owned by you:     1 (alice)"));
    }

    #[test]
    fn test_fuel_type_frequencies_ascending() {
        let (mut ctx, transcript) = context("");
        seed(
            &mut ctx,
            "alice",
            vec![
                VehicleDraft::new("a", 1, 1, 1.0).with_fuel(FuelType::Nuclear),
                VehicleDraft::new("b", 1, 1, 1.0).with_fuel(FuelType::Nuclear),
                VehicleDraft::new("c", 1, 1, 1.0),
            ],
        );

        run(&PrintFieldAscendingFuelType, &[], &mut ctx).unwrap();
        let text = transcript.text();
        assert!(text.contains("null: 1"));
        assert!(text.contains("NUCLEAR: 2"));
        assert!(text.find("null: 1").unwrap() < text.find("NUCLEAR: 2").unwrap());
    }

    #[test]
    fn test_group_counting_by_engine_power() {
        let (mut ctx, transcript) = context("");
        seed(
            &mut ctx,
            "alice",
            vec![
                VehicleDraft::new("a", 1, 1, 7.5),
                VehicleDraft::new("b", 1, 1, 2.0),
                VehicleDraft::new("c", 1, 1, 7.5),
            ],
        );

        run(&GroupCountingByEnginePower, &[], &mut ctx).unwrap();
        let text = transcript.text();
        assert!(text.contains("2: 1"));
        assert!(text.contains("7.5: 2"));
        assert!(text.find("2: 1").unwrap() < text.find("7.5: 2").unwrap());
    }
}
