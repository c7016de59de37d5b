//! Property-based tests for build file merging.

use super::merger::ConfigMerger;
use super::schema::{BuildConfig, SourceMapConfig, TaskDefinition};
use crate::plug::SourceMapOutput;
use proptest::prelude::*;
use std::collections::HashSet;

fn output_strategy() -> impl Strategy<Value = SourceMapOutput> {
    prop_oneof![
        Just(SourceMapOutput::Sibling),
        Just(SourceMapOutput::Inline),
        Just(SourceMapOutput::None),
    ]
}

fn source_maps_strategy() -> impl Strategy<Value = SourceMapConfig> {
    (
        prop::option::of(any::<bool>()),
        prop::option::of(any::<bool>()),
        prop::option::of(output_strategy()),
    )
        .prop_map(|(combine, sources_content, output)| SourceMapConfig {
            combine,
            sources_content,
            output,
        })
}

// Task names from a small alphabet so merges actually collide.
fn tasks_strategy() -> impl Strategy<Value = Vec<TaskDefinition>> {
    prop::collection::vec(("[a-e]", prop::option::of("[a-z]{1,8}")), 0..6).prop_map(|defs| {
        let mut seen = HashSet::new();
        defs.into_iter()
            .filter(|(name, _)| seen.insert(name.clone()))
            .map(|(name, description)| TaskDefinition {
                name,
                description,
                series: Some(vec![]),
                ..Default::default()
            })
            .collect()
    })
}

fn config_strategy() -> impl Strategy<Value = BuildConfig> {
    (
        prop::option::of(any::<bool>()),
        prop::option::of(source_maps_strategy()),
        tasks_strategy(),
    )
        .prop_map(|(case_sensitive, source_maps, tasks)| BuildConfig {
            case_sensitive,
            source_maps,
            tasks,
            ..Default::default()
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Merging with an empty config preserves everything
    #[test]
    fn config_merge_identity(config in config_strategy()) {
        let mut merged = config.clone();
        ConfigMerger::merge_into(&mut merged, &BuildConfig::default());
        prop_assert_eq!(merged, config);
    }

    // The child's values win where it has them
    #[test]
    fn config_merge_child_wins(low in config_strategy(), high in config_strategy()) {
        let mut result = low.clone();
        ConfigMerger::merge_into(&mut result, &high);

        prop_assert_eq!(result.case_sensitive, high.case_sensitive.or(low.case_sensitive));
        for task in &high.tasks {
            prop_assert_eq!(result.task(&task.name), Some(task));
        }
        for task in &low.tasks {
            if high.task(&task.name).is_none() {
                prop_assert_eq!(result.task(&task.name), Some(task));
            }
        }
    }

    // Task names stay unique and parent order is kept
    #[test]
    fn config_merge_tasks_unique(low in config_strategy(), high in config_strategy()) {
        let mut result = low.clone();
        ConfigMerger::merge_into(&mut result, &high);

        let names: Vec<_> = result.tasks.iter().map(|t| t.name.clone()).collect();
        let unique: HashSet<_> = names.iter().cloned().collect();
        prop_assert_eq!(names.len(), unique.len());
        for (index, task) in low.tasks.iter().enumerate() {
            prop_assert_eq!(&names[index], &task.name);
        }
    }

    // Merging is associative
    #[test]
    fn config_merge_associative(
        a in config_strategy(),
        b in config_strategy(),
        c in config_strategy()
    ) {
        let mut left = a.clone();
        ConfigMerger::merge_into(&mut left, &b);
        ConfigMerger::merge_into(&mut left, &c);

        let mut b_merge_c = b;
        ConfigMerger::merge_into(&mut b_merge_c, &c);
        let mut right = a;
        ConfigMerger::merge_into(&mut right, &b_merge_c);

        prop_assert_eq!(left, right);
    }
}
