//! End-to-end scenarios (spec.md §8): each exercises `load()` against a
//! literal module source and checks the documented outcome.

use pretty_assertions::assert_eq;
use smi::{codes, LoadOptionsBuilder, LoadOutcome, LoadStrictness, MapSource};
use smi_semantic::model::Kind;

fn load_text(name: &str, text: &str) -> (smi_semantic::Mib, LoadOutcome) {
    let option = LoadOptionsBuilder::new()
        .source(MapSource::new().with_module(name, text))
        .build();
    smi::load(option)
}

/// Scenario 1: synthetic table.
#[test]
fn synthetic_table_classifies_and_places_oids() {
    let text = r#"
SYNTHETIC-MIB DEFINITIONS ::= BEGIN
syntheticMIB OBJECT IDENTIFIER ::= { iso 3 6 1 2 1 999 }
syntheticSimpleTable OBJECT-TYPE
    SYNTAX SEQUENCE OF SyntheticSimpleEntry
    MAX-ACCESS not-accessible
    STATUS current
    DESCRIPTION "table"
    ::= { syntheticMIB 2 1 }
SyntheticSimpleEntry ::= SEQUENCE {
    syntheticSimpleIndex Unsigned32
}
syntheticSimpleEntry OBJECT-TYPE
    SYNTAX SyntheticSimpleEntry
    MAX-ACCESS not-accessible
    STATUS current
    DESCRIPTION "row"
    INDEX { syntheticSimpleIndex }
    ::= { syntheticSimpleTable 1 }
syntheticSimpleIndex OBJECT-TYPE
    SYNTAX Unsigned32 (1..65535)
    MAX-ACCESS read-only
    STATUS current
    DESCRIPTION "index"
    ::= { syntheticSimpleEntry 1 }
END
"#;
    let (mib, outcome) = load_text("SYNTHETIC-MIB", text);
    assert_eq!(outcome, LoadOutcome::Ok);

    let table = mib.object("syntheticSimpleTable").unwrap();
    assert_eq!(mib.get_node(table.node).kind, Kind::Table);
    assert_eq!(table.oid.arcs(), &[1, 3, 6, 1, 2, 1, 999, 2, 1]);

    let row = mib.object("syntheticSimpleEntry").unwrap();
    assert_eq!(mib.get_node(row.node).kind, Kind::Row);
    assert_eq!(row.oid.arcs(), &[1, 3, 6, 1, 2, 1, 999, 2, 1, 1]);

    let column = mib.object("syntheticSimpleIndex").unwrap();
    assert_eq!(mib.get_node(column.node).kind, Kind::Column);
    assert_eq!(column.oid.arcs(), &[1, 3, 6, 1, 2, 1, 999, 2, 1, 1, 1]);
    assert_eq!(column.access, Some(smi_semantic::model::Access::ReadOnly));
    let column_id = mib.get_node(column.node).primary_object().unwrap();
    assert_eq!(
        mib.effective_ranges(column_id),
        &[smi_semantic::model::Constraint { min: 1, max: 65535 }]
    );

    let found = mib
        .longest_prefix(&smi_semantic::Oid::new(vec![1, 3, 6, 1, 2, 1, 999, 2, 1, 1, 1, 5]))
        .unwrap();
    assert_eq!(found, column.node);
}

/// Scenario 2: AUGMENTS propagation.
#[test]
fn augments_row_inherits_base_row_index() {
    let text = r#"
SYNTHETIC-MIB DEFINITIONS ::= BEGIN
syntheticMIB OBJECT IDENTIFIER ::= { iso 999 }
syntheticSimpleTable OBJECT-TYPE
    SYNTAX SEQUENCE OF SyntheticSimpleEntry
    MAX-ACCESS not-accessible
    STATUS current
    DESCRIPTION "table"
    ::= { syntheticMIB 1 }
SyntheticSimpleEntry ::= SEQUENCE {
    syntheticSimpleIndex Unsigned32
}
syntheticSimpleEntry OBJECT-TYPE
    SYNTAX SyntheticSimpleEntry
    MAX-ACCESS not-accessible
    STATUS current
    DESCRIPTION "row"
    INDEX { syntheticSimpleIndex }
    ::= { syntheticSimpleTable 1 }
syntheticSimpleIndex OBJECT-TYPE
    SYNTAX Unsigned32 (1..65535)
    MAX-ACCESS read-only
    STATUS current
    DESCRIPTION "index"
    ::= { syntheticSimpleEntry 1 }
syntheticAugmentTable OBJECT-TYPE
    SYNTAX SEQUENCE OF SyntheticAugmentEntry
    MAX-ACCESS not-accessible
    STATUS current
    DESCRIPTION "table"
    ::= { syntheticMIB 2 }
SyntheticAugmentEntry ::= SEQUENCE {
    syntheticAugmentValue Unsigned32
}
syntheticAugmentEntry OBJECT-TYPE
    SYNTAX SyntheticAugmentEntry
    MAX-ACCESS not-accessible
    STATUS current
    DESCRIPTION "augmenting row"
    AUGMENTS { syntheticSimpleEntry }
    ::= { syntheticAugmentTable 1 }
syntheticAugmentValue OBJECT-TYPE
    SYNTAX Unsigned32
    MAX-ACCESS read-only
    STATUS current
    DESCRIPTION "value"
    ::= { syntheticAugmentEntry 1 }
END
"#;
    let (mib, outcome) = load_text("SYNTHETIC-MIB", text);
    assert_eq!(outcome, LoadOutcome::Ok);

    let base_index = mib.object("syntheticSimpleIndex").unwrap();
    let augment_row = mib.object("syntheticAugmentEntry").unwrap();
    let names: Vec<&str> = augment_row
        .effective_index
        .iter()
        .map(|col| mib.get_object(col.object).name.as_str())
        .collect();
    assert_eq!(names, vec![base_index.name.as_str()]);
    assert!(!mib.diagnostics().iter().any(|d| d.code == codes::ROW_MISSING_INDEX));
}

/// Scenario 3: overlapping modules — IF-MIB and RFC1213-MIB both define
/// `ifEntry` at the same OID; SMIv2 wins the module preference rule.
#[test]
fn overlapping_modules_prefer_smiv2() {
    let if_mib = r#"
IF-MIB DEFINITIONS ::= BEGIN
ifMIBModule MODULE-IDENTITY
    LAST-UPDATED "9901010000Z"
    ORGANIZATION "IETF"
    CONTACT-INFO "test"
    DESCRIPTION "interfaces MIB module"
    ::= { iso 3 6 1 2 1 2 999 }
ifMIB OBJECT IDENTIFIER ::= { iso 3 6 1 2 1 2 }
ifTable OBJECT-TYPE
    SYNTAX SEQUENCE OF IfEntry
    MAX-ACCESS not-accessible
    STATUS current
    DESCRIPTION "table"
    ::= { ifMIB 2 }
IfEntry ::= SEQUENCE {
    ifIndex Unsigned32
}
ifEntry OBJECT-TYPE
    SYNTAX IfEntry
    MAX-ACCESS not-accessible
    STATUS current
    DESCRIPTION "row"
    INDEX { ifIndex }
    ::= { ifTable 1 }
ifIndex OBJECT-TYPE
    SYNTAX Unsigned32
    MAX-ACCESS read-only
    STATUS current
    DESCRIPTION "index"
    ::= { ifEntry 1 }
END
"#;
    let rfc1213_mib = r#"
RFC1213-MIB DEFINITIONS ::= BEGIN
ifMIB OBJECT IDENTIFIER ::= { iso 3 6 1 2 1 2 }
ifTable OBJECT-TYPE
    SYNTAX SEQUENCE OF IfEntry
    ACCESS not-accessible
    STATUS mandatory
    DESCRIPTION "table"
    ::= { ifMIB 2 }
IfEntry ::= SEQUENCE {
    ifIndex INTEGER
}
ifEntry OBJECT-TYPE
    SYNTAX IfEntry
    ACCESS not-accessible
    STATUS mandatory
    DESCRIPTION "row"
    INDEX { ifIndex }
    ::= { ifTable 1 }
ifIndex OBJECT-TYPE
    SYNTAX INTEGER
    ACCESS read-only
    STATUS mandatory
    DESCRIPTION "index"
    ::= { ifEntry 1 }
END
"#;
    let option = LoadOptionsBuilder::new()
        .source(MapSource::new().with_module("IF-MIB", if_mib).with_module("RFC1213-MIB", rfc1213_mib))
        .build();
    let (mib, outcome) = smi::load(option);
    assert_eq!(outcome, LoadOutcome::Ok);

    let if_mib_row = mib.object_qualified("IF-MIB", "ifEntry").unwrap();
    let rfc_row = mib.object_qualified("RFC1213-MIB", "ifEntry").unwrap();
    assert!(!if_mib_row.index.is_empty());
    assert!(!rfc_row.index.is_empty());

    let node = mib.get_node(if_mib_row.node);
    let primary_module = mib.get_module(node.primary_module().unwrap());
    assert_eq!(primary_module.name.as_str(), "IF-MIB");

    // Plain-name lookup must agree with the primary binding above,
    // regardless of which module happened to load first.
    let plain_node = mib.node("ifEntry").unwrap();
    assert_eq!(plain_node, if_mib_row.node);
    let plain_object = mib.object("ifEntry").unwrap();
    assert_eq!(plain_object.module, node.primary_module().unwrap());
}

/// Scenario 4: DEFVAL hex-zeros canonicalization.
#[test]
fn defval_all_zero_bytes_canonicalize_to_integer_zero() {
    let text = r#"
SYNTHETIC-MIB DEFINITIONS ::= BEGIN
syntheticMIB OBJECT IDENTIFIER ::= { iso 999 }
syntheticCounter OBJECT-TYPE
    SYNTAX Unsigned32
    MAX-ACCESS read-only
    STATUS current
    DESCRIPTION "counter"
    DEFVAL { '00000000'H }
    ::= { syntheticMIB 1 }
END
"#;
    let (mib, outcome) = load_text("SYNTHETIC-MIB", text);
    assert_eq!(outcome, LoadOutcome::Ok);
    let object = mib.object("syntheticCounter").unwrap();
    assert_eq!(object.default_value.kind(), "bytes");
    assert_eq!(object.default_value.as_integer(), Some(0));
}

/// Scenario 5: TC hint inheritance.
#[test]
fn display_hint_inherits_from_textual_convention() {
    let text = r#"
SYNTHETIC-MIB DEFINITIONS ::= BEGIN
SyntheticFixedOctetString ::= TEXTUAL-CONVENTION
    DISPLAY-HINT "8x"
    STATUS current
    DESCRIPTION "fixed"
    SYNTAX OCTET STRING (SIZE (8))
syntheticMIB OBJECT IDENTIFIER ::= { iso 999 }
syntheticFixed OBJECT-TYPE
    SYNTAX SyntheticFixedOctetString
    MAX-ACCESS read-only
    STATUS current
    DESCRIPTION "fixed value"
    ::= { syntheticMIB 1 }
END
"#;
    let (mib, outcome) = load_text("SYNTHETIC-MIB", text);
    assert_eq!(outcome, LoadOutcome::Ok);
    let object = mib.object("syntheticFixed").unwrap();
    assert_eq!(object.effective_display_hint.as_deref(), Some("8x"));
}

/// Scenario 6: strict-mode identifier violations.
#[test]
fn strict_mode_reports_underscore_identifiers_permissive_does_not() {
    let text = "TEST_MIB DEFINITIONS ::= BEGIN\ntest_object OBJECT IDENTIFIER ::= { iso 3 }\nEND";

    let strict_option = LoadOptionsBuilder::new()
        .source(MapSource::new().with_module("TEST_MIB", text))
        .strictness(LoadStrictness::Strict)
        .build();
    let (strict_mib, _) = smi::load(strict_option);
    let strict_count = strict_mib
        .diagnostics()
        .iter()
        .filter(|d| d.code == codes::IDENTIFIER_UNDERSCORE)
        .count();
    assert_eq!(strict_count, 2);

    let permissive_option = LoadOptionsBuilder::new()
        .source(MapSource::new().with_module("TEST_MIB", text))
        .strictness(LoadStrictness::Permissive)
        .build();
    let (permissive_mib, _) = smi::load(permissive_option);
    let permissive_count = permissive_mib
        .diagnostics()
        .iter()
        .filter(|d| d.code == codes::IDENTIFIER_UNDERSCORE)
        .count();
    assert_eq!(permissive_count, 0);
}
