//! Classification and layout order of the attributes a rule file exposes.
//!
//! Attributes are grouped by owning rule file (the main rule file first),
//! then by group path (parents directly before their children), then by
//! explicit order and finally by name.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

pub const ANNOT_HIDDEN: &str = "@Hidden";
pub const ANNOT_ORDER: &str = "@Order";
pub const ANNOT_GROUP: &str = "@Group";

const FULL_NAME_PREFIX: &str = "PRT";
const STYLE_SEPARATOR: char = '$';
const IMPORT_SEPARATOR: char = '.';
const RULE_FILE_EXTENSION: &str = ".cgb";

/// Explicit ordering precedence. `First` sorts before every value and `None`
/// after every value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Order {
    First,
    Value(i32),
    #[default]
    None,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::First => write!(f, "first"),
            Order::Value(value) => write!(f, "{}", value),
            Order::None => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleValueType {
    Bool,
    Float,
    String,
    BoolArray,
    FloatArray,
    StringArray,
    Void,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AnnotationArgument {
    Bool(bool),
    Number(f64),
    Str(String),
}

impl AnnotationArgument {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnnotationArgument::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationArgument::Str(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<AnnotationArgument>,
}

/// One attribute entry as reported by the rule file info query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFileEntry {
    pub name: String,
    pub return_type: RuleValueType,
    #[serde(default)]
    pub num_parameters: usize,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleFileInfo {
    #[serde(default)]
    pub attributes: Vec<RuleFileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleAttribute {
    pub fq_name: String,
    pub full_name: String,
    pub brief_name: String,
    pub nice_name: String,
    pub value_type: RuleValueType,
    pub rule_file: String,
    pub member_of_start_rule_file: bool,
    pub order: Order,
    pub groups: Vec<String>,
    pub group_order: Order,
}

impl fmt::Display for RuleAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleAttribute '{}': order = {}, groupOrder = {}, ruleFile = '{}', groups = [ {} ]",
            self.fq_name,
            self.order,
            self.group_order,
            self.rule_file,
            self.groups.join(" ")
        )
    }
}

pub type RuleAttributes = Vec<RuleAttribute>;

/// Minimum explicit group order per group path prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeGroupOrder(BTreeMap<Vec<String>, Order>);

impl AttributeGroupOrder {
    pub fn get(&self, groups: &[String]) -> Option<Order> {
        self.0.get(groups).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[String], Order)> {
        self.0.iter().map(|(groups, order)| (groups.as_slice(), *order))
    }
}

impl fmt::Display for AttributeGroupOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (groups, order) in &self.0 {
            writeln!(f, "[ {} ] = {}", groups.join(" "), order)?;
        }
        Ok(())
    }
}

fn clean_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

fn remove_style(fq_name: &str) -> &str {
    match fq_name.find(STYLE_SEPARATOR) {
        Some(index) => &fq_name[index + 1..],
        None => fq_name,
    }
}

fn remove_import(name: &str) -> &str {
    match name.rfind(IMPORT_SEPARATOR) {
        Some(index) => &name[index + 1..],
        None => name,
    }
}

pub fn full_name(fq_name: &str) -> String {
    format!("{}{}", FULL_NAME_PREFIX, clean_name(fq_name))
}

pub fn brief_name(fq_name: &str) -> String {
    clean_name(remove_style(fq_name))
}

pub fn nice_name(fq_name: &str) -> String {
    clean_name(remove_import(remove_style(fq_name)))
}

/// File name of the rule file path without its `.cgb` extension.
pub fn main_rule_name(rule_file: &str) -> String {
    let file_name = rule_file
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(rule_file);
    match file_name.find(RULE_FILE_EXTENSION) {
        Some(index) => file_name[..index].to_string(),
        None => file_name.to_string(),
    }
}

fn classify(entry: &RuleFileEntry, main_rule: &str) -> Option<RuleAttribute> {
    if entry.num_parameters != 0 {
        return None;
    }

    let fq_name = entry.name.clone();
    let unstyled = remove_style(&fq_name);
    let (rule_file, member_of_start_rule_file) = match unstyled.rfind(IMPORT_SEPARATOR) {
        Some(index) => (unstyled[..index].to_string(), false),
        None => (main_rule.to_string(), true),
    };

    let mut hidden = false;
    let mut order = Order::None;
    let mut groups = Vec::new();
    let mut group_order = Order::None;
    for annotation in &entry.annotations {
        match annotation.name.as_str() {
            ANNOT_HIDDEN => hidden = true,
            ANNOT_ORDER => {
                if let Some(value) = annotation.arguments.first().and_then(|arg| arg.as_number()) {
                    order = Order::Value(value as i32);
                }
            }
            ANNOT_GROUP => {
                let last = annotation.arguments.len().saturating_sub(1);
                for (index, argument) in annotation.arguments.iter().enumerate() {
                    if let Some(group) = argument.as_str() {
                        groups.push(group.to_string());
                    } else if index == last {
                        if let Some(value) = argument.as_number() {
                            group_order = Order::Value(value as i32);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    if hidden {
        return None;
    }

    if groups.is_empty() {
        group_order = Order::First;
    }

    Some(RuleAttribute {
        full_name: full_name(&fq_name),
        brief_name: brief_name(&fq_name),
        nice_name: nice_name(&fq_name),
        value_type: entry.return_type,
        rule_file,
        member_of_start_rule_file,
        order,
        groups,
        group_order,
        fq_name,
    })
}

/// Classifies the parameterless, non-hidden attributes of a rule file in
/// query order. `rule_file` names the main rule file (path or file name).
pub fn get_rule_attributes(rule_file: &str, info: &RuleFileInfo) -> RuleAttributes {
    let main_rule = main_rule_name(rule_file);
    let attributes: RuleAttributes = info
        .attributes
        .iter()
        .filter_map(|entry| classify(entry, &main_rule))
        .collect();
    for attribute in &attributes {
        trace!("{}", attribute);
    }
    attributes
}

/// Records, for every prefix of every group path, the lowest group order of
/// any attribute inside it.
pub fn global_group_order(attributes: &[RuleAttribute]) -> AttributeGroupOrder {
    let mut table = BTreeMap::new();
    for attribute in attributes {
        for depth in 1..=attribute.groups.len() {
            let entry = table
                .entry(attribute.groups[..depth].to_vec())
                .or_insert(Order::None);
            *entry = (*entry).min(attribute.group_order);
        }
    }
    AttributeGroupOrder(table)
}

fn cmp_lowercase(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

fn is_child_of(child: &RuleAttribute, parent: &RuleAttribute) -> bool {
    parent.groups.len() < child.groups.len() && child.groups.starts_with(&parent.groups)
}

fn cmp_rule_file(a: &RuleAttribute, b: &RuleAttribute) -> Ordering {
    b.member_of_start_rule_file
        .cmp(&a.member_of_start_rule_file)
        .then_with(|| cmp_lowercase(&a.rule_file, &b.rule_file))
}

fn cmp_groups(a: &RuleAttribute, b: &RuleAttribute, table: &AttributeGroupOrder) -> Ordering {
    if is_child_of(a, b) {
        return Ordering::Greater;
    }
    if is_child_of(b, a) {
        return Ordering::Less;
    }

    let order_a = table.get(&a.groups).unwrap_or(Order::None);
    let order_b = table.get(&b.groups).unwrap_or(Order::None);
    order_a
        .cmp(&order_b)
        .then_with(|| a.groups.len().cmp(&b.groups.len()))
        .then_with(|| {
            a.groups
                .iter()
                .zip(&b.groups)
                .find(|(x, y)| x != y)
                .map_or(Ordering::Equal, |(x, y)| cmp_lowercase(x, y))
        })
}

fn cmp_attribute_order(a: &RuleAttribute, b: &RuleAttribute) -> Ordering {
    a.order
        .cmp(&b.order)
        .then_with(|| cmp_lowercase(&a.fq_name, &b.fq_name))
}

/// Total order used for laying out attributes.
pub fn compare_attributes(
    a: &RuleAttribute,
    b: &RuleAttribute,
    table: &AttributeGroupOrder,
) -> Ordering {
    if a.rule_file != b.rule_file || a.member_of_start_rule_file != b.member_of_start_rule_file {
        return cmp_rule_file(a, b);
    }
    if a.groups != b.groups {
        return cmp_groups(a, b, table);
    }
    cmp_attribute_order(a, b)
}

pub fn sort_rule_attributes(attributes: &mut [RuleAttribute]) {
    let table = global_group_order(attributes);
    trace!("global group order:\n{}", table);
    attributes.sort_by(|a, b| compare_attributes(a, b, &table));
}
