//! Load a rule set from TOML
//!
//! The file is read into plain `Toml*` structs first and then converted, so
//! every name (goods, property, modifier operation, effects policy) is
//! resolved once here and never at query time.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::city::buildable::{BuildableKind, BuildableType};
use crate::city::goods::GoodsType;
use crate::core::config::{GameOptions, MonarchConfig};
use crate::core::error::{Result, RulesError};
use crate::core::types::{Id, Turn};
use crate::features::container::FeatureContainer;
use crate::features::effect::{Disaster, Effect, EffectsPolicy};
use crate::features::feature::{Ability, FeatureInfo};
use crate::features::modifier::{Increment, Modifier, ModifierOp};
use crate::features::scope::{Property, Scope};
use crate::rules::equipment::EquipmentType;
use crate::rules::ruleset::RuleSet;

impl RuleSet {
    /// Load and validate a rules file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let rules = Self::parse_toml(&content)?;
        tracing::info!(
            "Loaded rules from {}: {} goods, {} buildables, {} equipment, {} disasters",
            path.display(),
            rules.goods_types().len(),
            rules.buildables().len(),
            rules.equipment_types().len(),
            rules.disasters().len()
        );
        Ok(rules)
    }

    /// Parse rules from a TOML string; all references must resolve
    pub fn parse_toml(content: &str) -> Result<Self> {
        let data: TomlRules = toml::from_str(content)?;
        let mut rules = RuleSet::new(data.options, data.monarch)?;

        for goods in data.goods {
            let index = rules.next_goods_index();
            rules.add_goods_type(goods.into_goods_type(index)?)?;
        }
        for buildable in data.buildables {
            let index = rules.next_buildable_index();
            rules.add_buildable(buildable.into_buildable(index)?)?;
        }
        for equipment in data.equipment {
            let index = rules.next_equipment_index();
            rules.add_equipment(equipment.into_equipment(index)?)?;
        }
        for disaster in data.disasters {
            rules.add_disaster(disaster.into_disaster()?)?;
        }

        rules.validate_references()?;
        check_monarch_units(&rules)?;
        Ok(rules)
    }
}

/// Monarch unit references must name loaded unit types, if any are loaded
fn check_monarch_units(rules: &RuleSet) -> Result<()> {
    if rules.buildables().iter().all(BuildableType::is_building) {
        return Ok(());
    }
    let config = rules.monarch_config();
    let referenced = config
        .mercenary_pool
        .iter()
        .chain(config.unit_prices.keys())
        .chain(config.support_land.iter().map(|u| &u.unit_type))
        .chain(config.support_sea.iter().map(|u| &u.unit_type));
    for unit_type in referenced {
        match rules.buildable(unit_type) {
            Some(b) if !b.is_building() => {}
            _ => return Err(RulesError::UnknownBuildableType(unit_type.clone())),
        }
    }
    Ok(())
}

/// TOML representation of a whole rules file
#[derive(Debug, Default, Deserialize)]
struct TomlRules {
    #[serde(default)]
    options: GameOptions,
    #[serde(default)]
    monarch: MonarchConfig,
    #[serde(default)]
    goods: Vec<TomlGoods>,
    #[serde(default)]
    buildables: Vec<TomlBuildable>,
    #[serde(default)]
    equipment: Vec<TomlEquipment>,
    #[serde(default)]
    disasters: Vec<TomlDisaster>,
}

#[derive(Debug, Deserialize)]
struct TomlGoods {
    id: String,
    #[serde(default)]
    storable: bool,
    #[serde(default)]
    food_type: bool,
    #[serde(flatten)]
    features: TomlFeatures,
}

#[derive(Debug, Deserialize)]
struct TomlGoodsAmount {
    goods: String,
    amount: u32,
}

#[derive(Debug, Deserialize)]
struct TomlBuildable {
    id: String,
    kind: String,
    upgrades_from: Option<String>,
    price: Option<u32>,
    #[serde(default)]
    naval: bool,
    #[serde(default = "default_population")]
    required_population: u32,
    #[serde(default)]
    required_goods: Vec<TomlGoodsAmount>,
    #[serde(default)]
    required_abilities: BTreeMap<String, bool>,
    #[serde(flatten)]
    features: TomlFeatures,
}

fn default_population() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct TomlEquipment {
    id: String,
    #[serde(default = "default_max_count")]
    max_count: u32,
    #[serde(default)]
    required_goods: Vec<TomlGoodsAmount>,
    #[serde(default)]
    required_unit_abilities: BTreeMap<String, bool>,
    #[serde(default)]
    compatible: Vec<String>,
    #[serde(flatten)]
    features: TomlFeatures,
}

fn default_max_count() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct TomlDisaster {
    id: String,
    effects_policy: String,
    #[serde(default)]
    effects: Vec<TomlEffect>,
}

#[derive(Debug, Deserialize)]
struct TomlEffect {
    id: String,
    probability: i64,
    #[serde(default)]
    scopes: Vec<TomlScope>,
    #[serde(flatten)]
    features: TomlFeatures,
}

/// Abilities and modifiers attached to any type
#[derive(Debug, Default, Deserialize)]
struct TomlFeatures {
    #[serde(default)]
    abilities: Vec<TomlAbility>,
    #[serde(default)]
    modifiers: Vec<TomlModifier>,
}

#[derive(Debug, Deserialize)]
struct TomlAbility {
    id: String,
    #[serde(default = "default_true")]
    value: bool,
    source: Option<String>,
    first_turn: Option<u32>,
    last_turn: Option<u32>,
    #[serde(default)]
    scopes: Vec<TomlScope>,
}

#[derive(Debug, Deserialize)]
struct TomlModifier {
    id: String,
    op: String,
    value: f32,
    #[serde(default)]
    priority: i32,
    source: Option<String>,
    first_turn: Option<u32>,
    last_turn: Option<u32>,
    increment: Option<f32>,
    increment_type: Option<String>,
    #[serde(default)]
    scopes: Vec<TomlScope>,
}

#[derive(Debug, Deserialize)]
struct TomlScope {
    #[serde(rename = "type")]
    target_type: Option<String>,
    ability: Option<String>,
    #[serde(default = "default_true")]
    ability_value: bool,
    property: Option<String>,
    property_value: Option<String>,
    #[serde(default)]
    negated: bool,
    #[serde(default = "default_true")]
    matches_null: bool,
}

fn default_true() -> bool {
    true
}

impl TomlGoods {
    fn into_goods_type(self, index: usize) -> Result<GoodsType> {
        let features = self.features.into_container(&self.id)?;
        Ok(GoodsType::new(self.id, index, self.storable)
            .with_food_type(self.food_type)
            .with_features(features))
    }
}

impl TomlBuildable {
    fn into_buildable(self, index: usize) -> Result<BuildableType> {
        let kind = match self.kind.to_lowercase().as_str() {
            "building" => BuildableKind::Building {
                upgrades_from: self.upgrades_from.map(Id::from),
            },
            "unit" => BuildableKind::Unit {
                price: self.price,
                naval: self.naval,
            },
            other => {
                return Err(RulesError::InvalidConfig(format!(
                    "{}: unknown buildable kind '{}'",
                    self.id, other
                )))
            }
        };

        let features = self.features.into_container(&self.id)?;
        let mut buildable = BuildableType::new(self.id, index, kind)
            .with_required_population(self.required_population)
            .with_features(features);
        for goods in self.required_goods {
            buildable = buildable.with_required_goods(goods.goods, goods.amount);
        }
        for (ability, value) in self.required_abilities {
            buildable = buildable.with_required_ability(ability, value);
        }
        Ok(buildable)
    }
}

impl TomlEquipment {
    fn into_equipment(self, index: usize) -> Result<EquipmentType> {
        let features = self.features.into_container(&self.id)?;
        let mut equipment = EquipmentType::new(self.id, index)
            .with_max_count(self.max_count)
            .with_features(features);
        for goods in self.required_goods {
            equipment = equipment.with_required_goods(goods.goods, goods.amount);
        }
        for (ability, value) in self.required_unit_abilities {
            equipment = equipment.with_required_unit_ability(ability, value);
        }
        for other in self.compatible {
            equipment = equipment.with_compatible_equipment(other);
        }
        Ok(equipment)
    }
}

impl TomlDisaster {
    fn into_disaster(self) -> Result<Disaster> {
        let policy: EffectsPolicy = self.effects_policy.parse()?;
        let effects = self
            .effects
            .into_iter()
            .map(TomlEffect::into_effect)
            .collect::<Result<Vec<_>>>()?;
        Disaster::new(self.id, policy, effects)
    }
}

impl TomlEffect {
    fn into_effect(self) -> Result<Effect> {
        let scopes = into_scopes(self.scopes)?;
        let features = self.features.into_container(&self.id)?;
        Ok(Effect::new(self.id, self.probability, scopes)?.with_features(features))
    }
}

impl TomlFeatures {
    /// Features without an explicit source are sourced to their owner
    fn into_container(self, owner: &str) -> Result<FeatureContainer> {
        let mut container = FeatureContainer::new();
        for ability in self.abilities {
            let info = feature_info(
                ability.id,
                ability.source.as_deref().unwrap_or(owner),
                ability.first_turn,
                ability.last_turn,
                ability.scopes,
            )?;
            container.add_ability(Ability::from_info(info, ability.value));
        }
        for modifier in self.modifiers {
            let op: ModifierOp = modifier.op.parse()?;
            let increment = match (modifier.increment, modifier.increment_type.as_deref()) {
                (None, _) => None,
                (Some(amount), None | Some("add")) => Some(Increment::Add(amount)),
                (Some(amount), Some("percentage")) => Some(Increment::Percentage(amount)),
                (Some(_), Some(other)) => {
                    return Err(RulesError::UnknownModifierOp(other.to_string()))
                }
            };
            let info = feature_info(
                modifier.id,
                modifier.source.as_deref().unwrap_or(owner),
                modifier.first_turn,
                modifier.last_turn,
                modifier.scopes,
            )?;
            let mut built = Modifier::from_info(info, op, modifier.value, modifier.priority);
            if let Some(increment) = increment {
                built = built.with_increment(increment);
            }
            container.add_modifier(built);
        }
        Ok(container)
    }
}

fn feature_info(
    id: String,
    source: &str,
    first_turn: Option<u32>,
    last_turn: Option<u32>,
    scopes: Vec<TomlScope>,
) -> Result<FeatureInfo> {
    FeatureInfo::new(id)
        .with_source(source)
        .with_scopes(into_scopes(scopes)?)
        .with_turn_window(first_turn.map(Turn), last_turn.map(Turn))
}

fn into_scopes(scopes: Vec<TomlScope>) -> Result<Vec<Scope>> {
    scopes.into_iter().map(TomlScope::into_scope).collect()
}

impl TomlScope {
    fn into_scope(self) -> Result<Scope> {
        let mut scope = Scope::any()
            .negated(self.negated)
            .with_matches_null(self.matches_null);
        if let Some(target_type) = self.target_type {
            scope = scope.with_type(target_type);
        }
        if let Some(ability) = self.ability {
            scope = scope.with_ability(ability, self.ability_value);
        }
        if let Some(name) = self.property {
            let property: Property = name.parse()?;
            let expected = self.property_value.ok_or_else(|| {
                RulesError::InvalidConfig(format!(
                    "scope property '{}' has no property_value",
                    name
                ))
            })?;
            scope = scope.with_property(property, expected);
        }
        Ok(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::scope::ScopeTarget;

    const MINIMAL: &str = r#"
[options]
save_production_overflow = true

[[goods]]
id = "model.goods.hammers"

[[goods]]
id = "model.goods.tools"
storable = true

[[buildables]]
id = "model.building.docks"
kind = "building"
required_population = 4
required_goods = [
    { goods = "model.goods.hammers", amount = 52 },
    { goods = "model.goods.tools", amount = 0 },
]

[[buildables.modifiers]]
id = "model.modifier.fishing"
op = "percentage"
value = 50.0
priority = 20
"#;

    #[test]
    fn test_parse_minimal_rules() {
        let rules = RuleSet::parse_toml(MINIMAL).unwrap();
        assert!(rules.options().save_production_overflow);
        assert_eq!(rules.options().maximum_tax, 70);
        assert_eq!(rules.goods_types().len(), 2);
        assert!(rules.is_storable(&Id::new("model.goods.tools")));
        assert!(!rules.is_storable(&Id::new("model.goods.hammers")));

        let docks = rules.buildable(&Id::new("model.building.docks")).unwrap();
        assert_eq!(docks.required_population(), 4);
        assert_eq!(docks.required_amount_of(&Id::new("model.goods.hammers")), 52);
        let fishing = docks.features().get_modifier(&Id::new("model.modifier.fishing")).unwrap();
        assert_eq!(fishing.op(), ModifierOp::Percentage);
        assert_eq!(fishing.source().map(Id::as_str), Some("model.building.docks"));
    }

    #[test]
    fn test_scope_and_window_parsed() {
        let rules = RuleSet::parse_toml(
            r#"
[[buildables]]
id = "model.unit.frigate"
kind = "unit"
naval = true
price = 5000

[[buildables.abilities]]
id = "model.ability.bombard"
first_turn = 3
last_turn = 9
scopes = [{ property = "naval", property_value = "true" }, { type = "model.unit.artillery" }]

[monarch]
mercenary_pool = []
unit_prices = { "model.unit.frigate" = 5000 }
support_land = []
support_sea = [{ unit_type = "model.unit.frigate", number = 1 }]
"#,
        )
        .unwrap();
        let frigate = rules.buildable(&Id::new("model.unit.frigate")).unwrap();
        let bombard = frigate.features().get_ability(&Id::new("model.ability.bombard")).unwrap();
        assert_eq!(bombard.scopes().len(), 2);
        assert!(bombard.applies_to_at(Some(frigate), Turn(5)));
        assert!(!bombard.applies_to_at(Some(frigate), Turn(10)));
        assert_eq!(frigate.type_id().as_str(), "model.unit.frigate");
    }

    #[test]
    fn test_unknown_property_is_load_error() {
        let result = RuleSet::parse_toml(
            r#"
[[goods]]
id = "model.goods.furs"

[[goods.modifiers]]
id = "model.modifier.price"
op = "add"
value = 1.0
scopes = [{ property = "colour", property_value = "brown" }]
"#,
        );
        assert!(matches!(result, Err(RulesError::UnknownProperty(name)) if name == "colour"));
    }

    #[test]
    fn test_unknown_modifier_op_is_load_error() {
        let result = RuleSet::parse_toml(
            r#"
[[goods]]
id = "model.goods.furs"

[[goods.modifiers]]
id = "model.modifier.price"
op = "divide"
value = 1.0
"#,
        );
        assert!(matches!(result, Err(RulesError::UnknownModifierOp(_))));
    }

    #[test]
    fn test_inverted_window_is_load_error() {
        let result = RuleSet::parse_toml(
            r#"
[[goods]]
id = "model.goods.furs"

[[goods.abilities]]
id = "model.ability.export"
first_turn = 10
last_turn = 2
"#,
        );
        assert!(matches!(result, Err(RulesError::InvalidTurnWindow { .. })));
    }

    #[test]
    fn test_unresolved_goods_is_load_error() {
        let result = RuleSet::parse_toml(
            r#"
[[buildables]]
id = "model.building.stockade"
kind = "building"
required_goods = [{ goods = "model.goods.hammers", amount = 64 }]
"#,
        );
        assert!(matches!(result, Err(RulesError::UnknownGoodsType(_))));
    }

    #[test]
    fn test_unpriced_monarch_unit_is_load_error() {
        let result = RuleSet::parse_toml(
            r#"
[[buildables]]
id = "model.unit.artillery"
kind = "unit"
"#,
        );
        // Defaults reference veteran soldiers and frigates, which are not loaded
        assert!(matches!(result, Err(RulesError::UnknownBuildableType(_))));
    }

    #[test]
    fn test_disaster_policy_validation() {
        let result = RuleSet::parse_toml(
            r#"
[[disasters]]
id = "model.disaster.flood"
effects_policy = "several"

[[disasters.effects]]
id = "model.disaster.effect.lossOfGoods"
probability = 120
"#,
        );
        assert!(matches!(result, Err(RulesError::InvalidProbability { probability: 120, .. })));

        let negative = RuleSet::parse_toml(
            r#"
[[disasters]]
id = "model.disaster.flood"
effects_policy = "one"

[[disasters.effects]]
id = "model.disaster.effect.lossOfGoods"
probability = -5
"#,
        );
        assert!(matches!(negative, Err(RulesError::InvalidProbability { probability: -5, .. })));
    }

    #[test]
    fn test_bad_kind_rejected() {
        let result = RuleSet::parse_toml(
            r#"
[[buildables]]
id = "model.building.docks"
kind = "tile"
"#,
        );
        assert!(matches!(result, Err(RulesError::InvalidConfig(_))));
    }
}
