//! Property-based tests over targets, kinds and unit definitions
//!
//! Properties checked:
//! 1. Rendered headers agree with the resolver for every configuration
//! 2. The simulated unit matches the typed resolution for arbitrary defines
//! 3. Static builds never carry a visibility annotation
//! 4. Composites are always visibility followed by deprecation
//! 5. Including a header twice changes nothing

use proptest::prelude::*;
use visgen::annotation::Annotation;
use visgen::build_config::{BuildConfig, BuildMode, DefineSet, LibraryKind};
use visgen::composer::{compose, Decoration};
use visgen::header::render;
use visgen::preprocess::{verify_header, Resolution, TranslationUnit};
use visgen::variant::{ExportHeaderOptions, LibraryVariant};

fn kind_strategy() -> impl Strategy<Value = LibraryKind> {
    prop_oneof![
        Just(LibraryKind::Shared),
        Just(LibraryKind::Module),
        Just(LibraryKind::Static),
        Just(LibraryKind::Object),
    ]
}

fn variant(target: &str, kind: LibraryKind) -> LibraryVariant {
    LibraryVariant::new(ExportHeaderOptions::new(target, kind)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_rendered_header_verifies(
        target in "[a-z][a-z0-9_]{0,15}",
        kind in kind_strategy(),
    ) {
        let v = variant(&target, kind);
        let mismatches = verify_header(&v, &render(&v)).unwrap();
        prop_assert!(mismatches.is_empty(), "{:?}", mismatches);
    }

    #[test]
    fn prop_unit_matches_typed_resolution(
        target in "[a-z][a-z0-9]{0,10}",
        kind in kind_strategy(),
        static_define in any::<bool>(),
        building in any::<bool>(),
        extra in prop::collection::vec("x_[a-z0-9]{1,6}", 0..4),
    ) {
        let v = variant(&target, kind);
        let mut defines = DefineSet::parse(&extra).unwrap();
        if static_define {
            defines.define(v.static_define());
        }
        if building {
            defines.define(v.exports_define());
        }

        let config = BuildConfig::resolve(&v, &defines);
        let mut unit = TranslationUnit::new(&defines);
        unit.include(&render(&v)).unwrap();
        let resolution = Resolution::from_unit(&v, &unit);

        for decoration in Decoration::ALL {
            let expected = compose(decoration, config).render();
            prop_assert_eq!(resolution.get(decoration), Some(expected.as_str()));
        }
    }

    #[test]
    fn prop_static_never_annotates_visibility(
        target in "[a-z][a-z0-9_]{0,12}",
        kind in kind_strategy(),
        building in any::<bool>(),
    ) {
        let v = variant(&target, kind);
        let mut defines = DefineSet::new();
        defines.define(v.static_define());
        if building {
            defines.define(v.exports_define());
        }
        let config = BuildConfig::resolve(&v, &defines);
        prop_assert_eq!(config.mode, BuildMode::Static);
        for decoration in Decoration::ALL {
            prop_assert_eq!(compose(decoration, config).visibility(), None);
        }
    }

    #[test]
    fn prop_composite_order(config_idx in 0usize..4) {
        let config = BuildConfig::all()[config_idx];
        for (composite, plain) in [
            (Decoration::DeprecatedExport, Decoration::Export),
            (Decoration::DeprecatedNoExport, Decoration::NoExport),
        ] {
            let list = compose(composite, config);
            prop_assert_eq!(list.as_slice().last(), Some(&Annotation::Deprecated));
            prop_assert_eq!(
                list,
                compose(plain, config).then(compose(Decoration::Deprecated, config))
            );
        }
    }

    #[test]
    fn prop_double_inclusion_idempotent(
        target in "[a-z][a-z0-9_]{0,12}",
        kind in kind_strategy(),
        static_define in any::<bool>(),
        building in any::<bool>(),
    ) {
        let v = variant(&target, kind);
        let mut defines = DefineSet::new();
        if static_define {
            defines.define(v.static_define());
        }
        if building {
            defines.define(v.exports_define());
        }
        let text = render(&v);

        let mut unit = TranslationUnit::new(&defines);
        unit.include(&text).unwrap();
        let once = unit.macros().clone();
        unit.include(&text).unwrap();

        prop_assert_eq!(unit.macros(), &once);
        prop_assert!(unit.conflicts().is_empty());
        prop_assert_eq!(unit.include_count(), 2);
    }
}
