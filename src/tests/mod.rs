use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::str::FromStr;

use chrono::{TimeZone, Utc};
use serde_json::json;

use crate::format::{format, format_with, ChildSpec, Format, FormatOptions, NodeKey, SeenHook,
    StyleKind};
use crate::value::{convert::from_json, Field, Props, ProtoProps, RecordLabel, RecordValue,
    SymbolValue, Value, ValueRef};

/// Compare rendered output, showing a line diff on mismatch.
fn assert_rendered(actual: &str, expected: &str) {
    if actual != expected {
        let diff = similar::TextDiff::from_lines(expected, actual);
        panic!("rendered output mismatch:\n{}", diff.unified_diff());
    }
}

fn sorted() -> FormatOptions {
    FormatOptions {
        sort: true,
        ..FormatOptions::default()
    }
}

mod scalars {
    use super::*;

    #[test]
    fn scalar_literals() {
        assert_eq!(format(&Value::null()), "null");
        assert_eq!(format(&Value::absent()), "undefined");
        assert_eq!(format(&Value::boolean(true)), "true");
        assert_eq!(format(&Value::boolean(false)), "false");
        assert_eq!(format(&Value::number(1.0)), "1");
        assert_eq!(format(&Value::number(1.5)), "1.5");
        assert_eq!(format(&Value::number(f64::NAN)), "NaN");
        assert_eq!(format(&Value::number(f64::INFINITY)), "Infinity");
    }

    #[test]
    fn large_integers_get_a_suffix() {
        assert_eq!(format(&Value::bigint(9007199254740993)), "9007199254740993n");
        assert_eq!(format(&Value::bigint(-12)), "-12n");
    }

    #[test]
    fn symbols_follow_registration() {
        assert_eq!(format(&Value::symbol("tag")), "Symbol(tag)");
        assert_eq!(format(&Value::symbol_for("tag")), "Symbol.for(tag)");
        assert_eq!(
            format(&Value::well_known_symbol("iterator")),
            "Symbol.iterator"
        );
    }

    #[test]
    fn functions_show_name_or_anonymous() {
        assert_eq!(format(&Value::function(Some("greet"))), "[Function: greet]");
        assert_eq!(format(&Value::function(None)), "[Function (anonymous)]");
    }

    #[test]
    fn instants_render_as_iso_timestamps() {
        let t = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format(&Value::instant(t)), "2020-01-02T03:04:05.000Z");
    }

    #[test]
    fn patterns_keep_source_and_flags() {
        assert_eq!(format(&Value::pattern("ab+c", "i")), "/ab+c/i");
        assert_eq!(format(&Value::pattern("x", "")), "/x/");
    }
}

mod strings {
    use super::*;

    #[test]
    fn one_line_text_is_quoted_inline() {
        assert_eq!(format(&Value::text("a")), "\"a\"");
        // a single trailing newline still counts as one line
        assert_eq!(format(&Value::text("a\n")), "\"a\\n\"");
    }

    #[test]
    fn empty_text_has_its_own_marker() {
        assert_eq!(format(&Value::text("")), "\"\"");
    }

    #[test]
    fn multi_line_text_renders_line_children() {
        assert_rendered(&format(&Value::text("a\nb\n")), "String(\n  a\n  b\n)");
    }

    #[test]
    fn multi_line_text_without_trailing_newline() {
        assert_rendered(&format(&Value::text("a\nb")), "String(\n  a\n  b\n)");
    }

    #[test]
    fn nested_text_indents_like_any_composite() {
        let subject = Value::record([("s", Value::text("x\ny\n"))]);
        assert_rendered(
            &format(&subject),
            "{\n  \"s\": String(\n    x\n    y\n  ),\n}",
        );
    }
}

mod records {
    use super::*;

    #[test]
    fn plain_record_omits_type_label() {
        let subject = Value::record([("a", Value::number(1.0))]);
        assert_rendered(&format(&subject), "{\n  \"a\": 1,\n}");
    }

    #[test]
    fn empty_record_collapses() {
        let subject = Value::record(Vec::<(String, ValueRef)>::new());
        assert_eq!(format(&subject), "{}");
    }

    #[test]
    fn null_prototype_records_are_labeled() {
        let subject = Value::record_null_proto([("a", Value::number(1.0))]);
        assert_rendered(&format(&subject), "Null Object {\n  \"a\": 1,\n}");
    }

    #[test]
    fn class_records_show_constructor_name() {
        let subject = Value::record_class("Widget", [("id", Value::number(7.0))]);
        assert_rendered(&format(&subject), "Widget {\n  \"id\": 7,\n}");
        let empty = Value::record_class("Widget", Vec::<(String, ValueRef)>::new());
        assert_eq!(format(&empty), "Widget {}");
    }

    #[test]
    fn insertion_order_is_preserved_by_default() {
        let subject = Value::record([("b", Value::number(1.0)), ("a", Value::number(2.0))]);
        assert_rendered(&format(&subject), "{\n  \"b\": 1,\n  \"a\": 2,\n}");
    }

    #[test]
    fn sort_orders_keys_alphabetically() {
        let subject = Value::record([("b", Value::number(1.0)), ("a", Value::number(2.0))]);
        assert_rendered(
            &format_with(&subject, sorted()),
            "{\n  \"a\": 2,\n  \"b\": 1,\n}",
        );
    }

    #[test]
    fn sort_is_case_insensitive() {
        let subject = Value::record([("B", Value::number(1.0)), ("a", Value::number(2.0))]);
        assert_rendered(
            &format_with(&subject, sorted()),
            "{\n  \"a\": 2,\n  \"B\": 1,\n}",
        );
    }

    #[test]
    fn symbol_keyed_fields_render_bracketed() {
        let subject = Value::record(Vec::<(String, ValueRef)>::new());
        subject.insert_field(Field::symbol_keyed(
            SymbolValue {
                name: "tag".to_string(),
                registered: false,
                well_known: false,
            },
            Value::number(1.0),
        ));
        assert_rendered(&format(&subject), "{\n  [Symbol(tag)]: 1,\n}");
    }

    #[test]
    fn raising_accessor_renders_absent() {
        let subject = Value::record([("ok", Value::number(1.0))]);
        subject.insert_field(Field::raising("bad"));
        assert_rendered(&format(&subject), "{\n  \"ok\": 1,\n  \"bad\": undefined,\n}");
    }

    #[test]
    fn getters_are_hidden_by_default() {
        let subject = record_with_proto_getter();
        assert_rendered(&format(&subject), "{\n  \"a\": 1,\n}");
    }

    #[test]
    fn include_getters_adds_prototype_accessors() {
        let subject = record_with_proto_getter();
        let options = FormatOptions {
            include_getters: true,
            ..FormatOptions::default()
        };
        assert_rendered(
            &format_with(&subject, options),
            "{\n  \"a\": 1,\n  \"g\": 5,\n}",
        );
    }

    #[test]
    fn include_enumerable_walks_the_prototype_chain() {
        let subject = Rc::new(Value::Record(RecordValue {
            label: RecordLabel::Plain,
            props: Props {
                own: RefCell::new(vec![Field::new("a", Value::number(1.0))]),
                protos: vec![
                    ProtoProps {
                        fields: vec![Field::new("p", Value::number(2.0))],
                    },
                    ProtoProps {
                        fields: vec![Field::new("q", Value::number(3.0))],
                    },
                ],
            },
        }));
        assert_rendered(&format(&subject), "{\n  \"a\": 1,\n}");
        let options = FormatOptions {
            include_enumerable: true,
            ..FormatOptions::default()
        };
        assert_rendered(
            &format_with(&subject, options),
            "{\n  \"a\": 1,\n  \"p\": 2,\n  \"q\": 3,\n}",
        );
    }

    fn record_with_proto_getter() -> ValueRef {
        Rc::new(Value::Record(RecordValue {
            label: RecordLabel::Plain,
            props: Props {
                own: RefCell::new(vec![Field::new("a", Value::number(1.0))]),
                protos: vec![ProtoProps {
                    fields: vec![Field::getter("g", Value::number(5.0))],
                }],
            },
        }))
    }
}

mod collections {
    use super::*;

    #[test]
    fn empty_collections_have_distinct_markers() {
        assert_eq!(format(&Value::list([])), "[]");
        assert_eq!(format(&Value::set([])), "Set {}");
        assert_eq!(format(&Value::map([])), "Map {}");
        assert_eq!(format(&Value::bytes(&b""[..])), "Buffer <>");
    }

    #[test]
    fn sequences_render_positional_entries() {
        let subject = Value::list([Value::number(1.0), Value::number(2.0)]);
        assert_rendered(&format(&subject), "[\n  1,\n  2,\n]");
    }

    #[test]
    fn nested_sequences_indent_per_level() {
        let subject = Value::record([(
            "list",
            Value::list([Value::number(1.0), Value::list([Value::number(2.0)])]),
        )]);
        assert_rendered(
            &format(&subject),
            "{\n  \"list\": [\n    1,\n    [\n      2,\n    ],\n  ],\n}",
        );
    }

    #[test]
    fn sets_render_membership_entries() {
        let subject = Value::set([Value::number(1.0), Value::text("x")]);
        assert_rendered(&format(&subject), "Set {\n  1,\n  \"x\",\n}");
    }

    #[test]
    fn map_keys_use_the_key_value_separator() {
        let subject = Value::map([(Value::text("k"), Value::number(1.0))]);
        assert_rendered(&format(&subject), "Map {\n  \"k\" => 1,\n}");
    }

    #[test]
    fn composite_map_keys_render_recursively() {
        let key = Value::record([("a", Value::number(1.0))]);
        let subject = Value::map([(key, Value::text("v"))]);
        assert_rendered(
            &format(&subject),
            "Map {\n  {\n    \"a\": 1,\n  } => \"v\",\n}",
        );
    }

    #[test]
    fn iterables_render_as_sequences_when_probing_succeeds() {
        let subject = Value::iterable([Value::number(1.0), Value::number(2.0)]);
        assert_rendered(&format(&subject), "Object [\n  1,\n  2,\n]");
    }

    #[test]
    fn failed_probe_falls_back_to_record() {
        let subject = Value::broken_iterable([("a", Value::number(1.0))]);
        assert_rendered(&format(&subject), "{\n  \"a\": 1,\n}");
    }
}

mod buffers {
    use super::*;

    fn chunked(chunk_size: usize) -> FormatOptions {
        FormatOptions {
            chunk_size: Some(chunk_size),
            ..FormatOptions::default()
        }
    }

    #[test]
    fn short_blobs_render_inline() {
        assert_eq!(format(&Value::bytes(&b"abc"[..])), "Buffer <61 62 63>");
    }

    #[test]
    fn chunk_boundary_is_respected_exactly() {
        // length chunk*3 + 2: three full lines plus one short line
        let subject = Value::bytes(&b"abcdabcdabcdab"[..]);
        assert_rendered(
            &format_with(&subject, chunked(4)),
            "Buffer <\n  0000: 61 62 63 64\n  0004: 61 62 63 64\n  0008: 61 62 63 64\n  000c: 61 62\n>",
        );
    }

    #[test]
    fn blob_length_just_under_threshold_stays_inline() {
        // short threshold is chunk + 5
        let subject = Value::bytes(&b"abcdabcd"[..]);
        assert_eq!(
            format_with(&subject, chunked(4)),
            "Buffer <61 62 63 64 61 62 63 64>"
        );
    }

    #[test]
    fn nested_blobs_indent_chunk_lines() {
        let subject = Value::record([("b", Value::bytes(&b"abcdabcdab"[..]))]);
        assert_rendered(
            &format_with(&subject, chunked(4)),
            "{\n  \"b\": Buffer <\n    0000: 61 62 63 64\n    0004: 61 62 63 64\n    0008: 61 62\n  >,\n}",
        );
    }
}

mod errors {
    use super::*;

    #[test]
    fn error_without_fields_renders_class_and_message() {
        assert_eq!(format(&Value::error("Error", "boom")), "Error: boom");
        assert_eq!(format(&Value::error("TypeError", "")), "TypeError {}");
    }

    #[test]
    fn hidden_cause_and_errors_fields_are_shown() {
        let subject = Value::error("Error", "boom");
        subject.insert_field(Field::hidden("cause", Value::text("root")));
        assert_rendered(
            &format(&subject),
            "Error: boom {\n  \"cause\": \"root\",\n}",
        );
    }

    #[test]
    fn hidden_keys_come_before_enumerable_ones() {
        let subject = Value::error("AggregateError", "several");
        subject.insert("code", Value::number(7.0));
        subject.insert_field(Field::hidden(
            "errors",
            Value::list([Value::error("Error", "one")]),
        ));
        assert_rendered(
            &format(&subject),
            "AggregateError: several {\n  \"errors\": [\n    Error: one,\n  ],\n  \"code\": 7,\n}",
        );
    }
}

mod cycles {
    use super::*;

    #[test]
    fn self_referential_record_renders_one_marker() {
        let subject = Value::record([("x", Value::number(1.0))]);
        subject.insert("self", Rc::clone(&subject));
        let rendered = format(&subject);
        assert_rendered(&rendered, "&ref_1 {\n  \"x\": 1,\n  \"self\": <*ref_1>,\n}");
        assert_eq!(rendered.matches("<*ref_1>").count(), 1);
    }

    #[test]
    fn self_referential_list_renders_one_marker() {
        let subject = Value::list([]);
        subject.push(Rc::clone(&subject));
        assert_rendered(&format(&subject), "&ref_1 [\n  <*ref_1>,\n]");
    }

    #[test]
    fn mutual_cycle_allocates_one_id_per_subject() {
        let a = Value::record(Vec::<(String, ValueRef)>::new());
        let b = Value::record(Vec::<(String, ValueRef)>::new());
        a.insert("b", Rc::clone(&b));
        b.insert("a", Rc::clone(&a));
        assert_rendered(
            &format(&a),
            "&ref_1 {\n  \"b\": {\n    \"a\": <*ref_1>,\n  },\n}",
        );
    }

    #[test]
    fn non_cyclic_repeats_are_not_flagged() {
        let a = Value::record([("x", Value::number(1.0))]);
        let subject = Value::record([("p", Rc::clone(&a)), ("q", Rc::clone(&a))]);
        assert_rendered(
            &format(&subject),
            "{\n  \"p\": {\n    \"x\": 1,\n  },\n  \"q\": {\n    \"x\": 1,\n  },\n}",
        );
    }

    #[test]
    fn deep_cycle_points_at_the_true_ancestor() {
        let root = Value::record(Vec::<(String, ValueRef)>::new());
        let mid = Value::record([("up", Rc::clone(&root))]);
        root.insert("down", mid);
        assert_rendered(
            &format(&root),
            "&ref_1 {\n  \"down\": {\n    \"up\": <*ref_1>,\n  },\n}",
        );
    }
}

mod rendering_contract {
    use super::*;

    #[test]
    fn print_is_idempotent() {
        let subject = Value::record([("a", Value::list([Value::number(1.0)]))]);
        let node = Format::root(subject, FormatOptions::default());
        let first = node.print();
        let second = node.print();
        assert_eq!(first, second);
    }

    #[test]
    fn scalar_roots_render_bare() {
        assert_eq!(format(&Value::number(42.0)), "42");
    }

    #[test]
    fn indent_unit_is_configurable() {
        let subject = Value::record([("a", Value::number(1.0))]);
        let options = FormatOptions {
            indent: "\t".to_string(),
            ..FormatOptions::default()
        };
        assert_rendered(&format_with(&subject, options), "{\n\t\"a\": 1,\n}");
    }

    #[test]
    #[should_panic(expected = "is_key is only valid")]
    fn key_children_require_a_map_parent() {
        let root = Format::root(
            Value::record([("a", Value::number(1.0))]),
            FormatOptions::default(),
        );
        let _ = root.child(
            Value::text("k"),
            ChildSpec {
                key: NodeKey::None,
                is_key: true,
                plain: false,
            },
        );
    }

    #[test]
    #[should_panic(expected = "non-map subject")]
    fn map_entries_reject_non_map_subjects() {
        let root = Format::root(Value::number(1.0), FormatOptions::default());
        let _ = root.map_entries();
    }

    struct CountingHook {
        calls: Cell<usize>,
    }

    impl SeenHook for CountingHook {
        fn seen<'a>(&self, node: &Format<'a>) -> Option<&'a Format<'a>> {
            self.calls.set(self.calls.get() + 1);
            node.default_seen()
        }
    }

    #[test]
    fn seen_hook_is_consulted_for_every_node() {
        let hook = Rc::new(CountingHook {
            calls: Cell::new(0),
        });
        let subject = Value::record([("a", Value::list([Value::number(1.0)]))]);
        let node = Format::root(Rc::clone(&subject), FormatOptions::default())
            .with_seen_hook(Rc::clone(&hook) as Rc<dyn SeenHook>);
        let rendered = node.print();
        assert_rendered(&rendered, &format(&subject));
        // root, record field, list entry
        assert_eq!(hook.calls.get(), 3);
    }
}

mod styles {
    use super::*;

    fn diff_style() -> FormatOptions {
        FormatOptions {
            style: StyleKind::Diff,
            ..FormatOptions::default()
        }
    }

    #[test]
    fn unknown_dialect_names_are_fatal() {
        let err = StyleKind::from_str("nope").unwrap_err();
        assert_eq!(err.to_string(), "unknown style: nope");
    }

    #[test]
    fn known_dialect_names_resolve() {
        assert_eq!(StyleKind::from_str("pretty").unwrap(), StyleKind::Pretty);
        assert_eq!(StyleKind::from_str("diff").unwrap(), StyleKind::Diff);
    }

    #[test]
    fn dialect_lookup_by_name() {
        assert_eq!(
            crate::style::lookup("pretty").map(|s| s.name()),
            Some("pretty")
        );
        assert_eq!(crate::style::lookup("diff").map(|s| s.name()), Some("diff"));
        assert!(crate::style::lookup("nope").is_none());
    }

    #[test]
    fn diff_dialect_drops_labels_and_bares_keys() {
        let subject = Value::record_class(
            "Widget",
            [("a", Value::number(1.0)), ("has space", Value::number(2.0))],
        );
        assert_rendered(
            &format_with(&subject, diff_style()),
            "{\n  a: 1,\n  \"has space\": 2,\n}",
        );
    }

    #[test]
    fn diff_dialect_keeps_reference_tags() {
        let subject = Value::record(Vec::<(String, ValueRef)>::new());
        subject.insert("self", Rc::clone(&subject));
        assert_rendered(
            &format_with(&subject, diff_style()),
            "&ref_1 {\n  self: <*ref_1>,\n}",
        );
    }
}

mod markup {
    use super::*;

    fn markup_subject() -> ValueRef {
        Value::markup("<Foo>\n  <Bar />\n</Foo>", [("type", Value::text("Foo"))])
    }

    #[test]
    fn markup_renders_opaquely_by_default() {
        assert_rendered(&format(&markup_subject()), "<Foo>\n  <Bar />\n</Foo>");
    }

    #[test]
    fn nested_markup_reindents_its_lines() {
        let subject = Value::record([("el", markup_subject())]);
        assert_rendered(
            &format(&subject),
            "{\n  \"el\": <Foo>\n    <Bar />\n  </Foo>,\n}",
        );
    }

    #[test]
    fn markup_string_off_falls_back_to_record_view() {
        let options = FormatOptions {
            markup_string: false,
            ..FormatOptions::default()
        };
        assert_rendered(
            &format_with(&markup_subject(), options),
            "{\n  \"type\": \"Foo\",\n}",
        );
    }

    #[test]
    fn demoted_markup_is_a_plain_record_without_label() {
        let options = FormatOptions {
            markup_string: false,
            ..FormatOptions::default()
        };
        let rendered = format_with(&markup_subject(), options);
        assert!(rendered.starts_with("{\n"));
        let empty = Value::markup("<Foo />", Vec::<(String, ValueRef)>::new());
        let options = FormatOptions {
            markup_string: false,
            ..FormatOptions::default()
        };
        assert_eq!(format_with(&empty, options), "{}");
    }

    #[test]
    fn dialects_without_markup_use_the_record_view() {
        let options = FormatOptions {
            style: StyleKind::Diff,
            ..FormatOptions::default()
        };
        assert_rendered(
            &format_with(&markup_subject(), options),
            "{\n  type: \"Foo\",\n}",
        );
    }
}

mod conversion {
    use super::*;

    #[test]
    fn json_documents_convert_and_render() {
        let json = json!({"b": 1, "a": [true, null, "x"]});
        let subject = from_json(&json);
        assert_rendered(
            &format(&subject),
            "{\n  \"b\": 1,\n  \"a\": [\n    true,\n    null,\n    \"x\",\n  ],\n}",
        );
    }

    #[test]
    fn huge_json_integers_become_bigints() {
        let json = json!(9007199254740993i64);
        assert_eq!(format(&from_json(&json)), "9007199254740993n");
    }

    #[test]
    fn key_collision_across_branches_is_not_a_cycle() {
        let json = json!({"p": {"x": 1}, "q": {"x": 1}});
        let rendered = format(&from_json(&json));
        assert!(!rendered.contains("ref_"));
    }
}

mod option_surface {
    use super::*;

    #[test]
    fn options_round_trip_through_serde() {
        let options = FormatOptions {
            sort: true,
            style: StyleKind::Diff,
            chunk_size: Some(8),
            ..FormatOptions::default()
        };
        let encoded = serde_json::to_string(&options).unwrap();
        let decoded: FormatOptions = serde_json::from_str(&encoded).unwrap();
        assert!(decoded.sort);
        assert_eq!(decoded.style, StyleKind::Diff);
        assert_eq!(decoded.chunk_size, Some(8));
        assert_eq!(decoded.indent, "  ");
    }

    #[test]
    fn default_options_use_the_pretty_dialect() {
        let options = FormatOptions::default();
        assert_eq!(options.style, StyleKind::Pretty);
        assert!(options.markup_string);
        assert_eq!(options.indent, "  ");
    }
}

mod key_collection {
    use super::*;

    #[test]
    fn text_keys_come_before_symbol_keys() {
        let subject = Value::record(Vec::<(String, ValueRef)>::new());
        subject.insert_field(Field::symbol_keyed(
            SymbolValue {
                name: "s".to_string(),
                registered: false,
                well_known: false,
            },
            Value::number(1.0),
        ));
        subject.insert("t", Value::number(2.0));
        assert_rendered(&format(&subject), "{\n  \"t\": 2,\n  [Symbol(s)]: 1,\n}");
    }

    #[test]
    fn non_enumerable_own_fields_are_skipped() {
        let subject = Value::record([("a", Value::number(1.0))]);
        subject.insert_field(Field::hidden("h", Value::number(2.0)));
        assert_rendered(&format(&subject), "{\n  \"a\": 1,\n}");
    }

    #[test]
    fn sort_orders_symbol_keys_by_display_form() {
        let subject = Value::record([("zz", Value::number(1.0))]);
        subject.insert_field(Field::symbol_keyed(
            SymbolValue {
                name: "aa".to_string(),
                registered: false,
                well_known: false,
            },
            Value::number(2.0),
        ));
        // "Symbol(aa)" sorts before "zz"
        assert_rendered(
            &format_with(&subject, sorted()),
            "{\n  [Symbol(aa)]: 2,\n  \"zz\": 1,\n}",
        );
    }

}
