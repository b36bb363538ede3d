//! Loading the sample rule set end to end

use std::path::Path;

use colonial_rules::city::GoodsType;
use colonial_rules::core::{Id, RulesError, Turn};
use colonial_rules::features::{ability, EffectsPolicy, Modifier, ModifierOp};
use colonial_rules::rules::RuleSet;

fn sample_rules() -> RuleSet {
    RuleSet::load_from_toml(Path::new("data/rules.toml")).unwrap()
}

fn id(s: &str) -> Id {
    Id::new(s)
}

// ============================================================================
// REGISTRIES
// ============================================================================

#[test]
fn test_sample_rules_load() {
    let rules = sample_rules();
    assert_eq!(rules.goods_types().len(), 6);
    assert_eq!(rules.buildables().len(), 10);
    assert_eq!(rules.equipment_types().len(), 3);
    assert_eq!(rules.disasters().len(), 3);
    assert_eq!(rules.options().maximum_tax, 70);
    assert!(!rules.options().save_production_overflow);
}

#[test]
fn test_indices_follow_file_order() {
    let rules = sample_rules();
    let goods: Vec<(usize, &str)> = rules
        .goods_types()
        .iter()
        .map(|g| (g.index(), g.id().as_str()))
        .collect();
    assert_eq!(goods[0], (0, "model.goods.food"));
    assert_eq!(goods[5], (5, "model.goods.bells"));

    for (position, buildable) in rules.buildables().iter().enumerate() {
        assert_eq!(buildable.index(), position);
    }
    assert_eq!(rules.buildable(&id("model.unit.caravel")).unwrap().index(), 9);
    assert_eq!(rules.equipment(&id("model.equipment.tools")).unwrap().max_count(), 5);
}

#[test]
fn test_goods_flags() {
    let rules = sample_rules();
    let food: &GoodsType = rules.goods_type(&id("model.goods.food")).unwrap();
    assert!(food.is_storable() && food.is_food_type());
    assert!(!rules.is_storable(&id("model.goods.hammers")));
    assert!(rules.is_storable(&id("model.goods.tools")));
}

#[test]
fn test_mercenary_units_found_by_ability() {
    let rules = sample_rules();
    let ids: Vec<&str> = rules
        .unit_types_with_ability(&id(ability::MERCENARY_UNIT))
        .iter()
        .map(|b| b.id().as_str())
        .collect();
    assert_eq!(ids, vec!["model.unit.veteranSoldier", "model.unit.artillery"]);
}

// ============================================================================
// FEATURES
// ============================================================================

#[test]
fn test_feature_sources_default_to_owner() {
    let rules = sample_rules();
    let fort = rules.buildable(&id("model.building.fort")).unwrap();
    let defence: &Modifier = fort.features().get_modifier(&id("model.modifier.defence")).unwrap();
    assert_eq!(defence.op(), ModifierOp::Percentage);
    assert_eq!(defence.priority(), 20);
    assert_eq!(defence.source().map(Id::as_str), Some("model.building.fort"));

    let muskets = rules.equipment(&id("model.equipment.muskets")).unwrap();
    let armed = muskets.features().get_ability(&id("model.ability.armed")).unwrap();
    assert_eq!(armed.source().map(Id::as_str), Some("model.equipment.muskets"));
}

#[test]
fn test_goods_modifier_applies() {
    let rules = sample_rules();
    let bells = rules.goods_type(&id("model.goods.bells")).unwrap();
    let liberty = bells
        .features()
        .apply_modifier(4.0, &id("model.modifier.liberty"), Some(bells), Turn(1));
    assert!((liberty - 5.0).abs() < 0.001);
}

// ============================================================================
// DISASTERS
// ============================================================================

#[test]
fn test_disaster_policies_loaded() {
    let rules = sample_rules();
    let policies: Vec<EffectsPolicy> = rules.disasters().iter().map(|d| d.policy()).collect();
    assert_eq!(
        policies,
        vec![EffectsPolicy::One, EffectsPolicy::Several, EffectsPolicy::All]
    );
}

#[test]
fn test_flood_scopes_target_buildings() {
    let rules = sample_rules();
    let flood = rules.disaster(&id("model.disaster.flood")).unwrap();
    let building_loss = &flood.effects()[1];
    assert!(building_loss.applies_to(rules.buildable(&id("model.building.docks"))));
    assert!(building_loss.applies_to(rules.buildable(&id("model.building.stockade"))));
    assert!(!building_loss.applies_to(rules.buildable(&id("model.building.fort"))));
}

#[test]
fn test_hurricane_ship_damage_needs_naval_target() {
    let rules = sample_rules();
    let hurricane = rules.disaster(&id("model.disaster.hurricane")).unwrap();
    let damage = &hurricane.effects()[0];
    assert!(damage.applies_to(rules.buildable(&id("model.unit.frigate"))));
    assert!(!damage.applies_to(rules.buildable(&id("model.unit.artillery"))));
}

#[test]
fn test_epidemic_penalty_expires() {
    let rules = sample_rules();
    let epidemic = rules.disaster(&id("model.disaster.epidemic")).unwrap();
    let mut colony = epidemic.effects()[1].features().clone();
    assert_eq!(colony.feature_count(), 1);

    assert_eq!(colony.expire(Turn(400)), 0);
    assert_eq!(colony.expire(Turn(401)), 1);
    assert!(colony.is_empty());
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn test_missing_file_is_io_error() {
    let result = RuleSet::load_from_toml(Path::new("data/no_such_rules.toml"));
    assert!(matches!(result, Err(RulesError::IoError(_))));
}

#[test]
fn test_malformed_toml_is_toml_error() {
    let result = RuleSet::parse_toml("[[goods]\nid = ");
    assert!(matches!(result, Err(RulesError::TomlError(_))));
}

#[test]
fn test_oversized_one_weights_rejected_at_load() {
    let content = r#"
[[disasters]]
id = "model.disaster.flood"
effects_policy = "one"

[[disasters.effects]]
id = "model.disaster.effect.lossOfGoods"
probability = 4294967295

[[disasters.effects]]
id = "model.disaster.effect.lossOfBuilding"
probability = 1
"#;
    let result = RuleSet::parse_toml(content);
    assert!(matches!(result, Err(RulesError::InvalidConfig(_))));
}
