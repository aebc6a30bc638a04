//! Fixed task list and configuration catalog.

use crate::types::{Mode, SchemaVariant};

/// One arithmetic task with its precomputed expected result.
///
/// `expected` is reporting data. Trials never assert against it; the point
/// is whether the agent chooses to verify, not whether it is right.
#[derive(Debug, Clone, Copy)]
pub struct TaskCase {
    pub name: &'static str,
    pub task: &'static str,
    pub expected: f64,
}

/// The ten tasks every configuration runs, in order. None of them asks for
/// verification explicitly; that choice is left to the response shaping.
pub const TASK_CASES: &[TaskCase] = &[
    TaskCase {
        name: "calc_01",
        task: "Compute (17 * 23) + (89 / 4) - 156.",
        expected: 257.25,
    },
    TaskCase {
        name: "calc_02",
        task: "Compute (1024 / 16) * 7 - (33 + 45).",
        expected: 370.0,
    },
    TaskCase {
        name: "calc_03",
        task: "Compute (999 - 123) * 2 / 4 + 67.",
        expected: 505.0,
    },
    TaskCase {
        name: "calc_04",
        task: "Compute (48 + 72) * 5 - (200 / 8).",
        expected: 575.0,
    },
    TaskCase {
        name: "calc_05",
        task: "Compute (144 / 12) + (35 * 6) - 89.",
        expected: 133.0,
    },
    TaskCase {
        name: "calc_06",
        task: "Compute (500 - 123) * 3 / 9 + 44.",
        expected: 169.67,
    },
    TaskCase {
        name: "calc_07",
        task: "Compute (81 / 9) * (14 + 6) - 55.",
        expected: 125.0,
    },
    TaskCase {
        name: "calc_08",
        task: "Compute (256 + 128) / 4 * 3 - 100.",
        expected: 188.0,
    },
    TaskCase {
        name: "calc_09",
        task: "Compute (77 * 11) - (324 / 18) + 29.",
        expected: 858.0,
    },
    TaskCase {
        name: "calc_10",
        task: "Compute (1000 - 450) / 5 + (32 * 4).",
        expected: 238.0,
    },
];

/// The fixed (mode, schema variant) configurations, in run order.
pub fn configs() -> Vec<(Mode, Option<SchemaVariant>)> {
    vec![
        (Mode::NoFormat, None),
        (Mode::ToolStrategy, Some(SchemaVariant::WithValidation)),
        (Mode::ProviderStrategy, Some(SchemaVariant::WithValidation)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_holds_ten_ordered_tasks() {
        assert_eq!(TASK_CASES.len(), 10);
        assert_eq!(TASK_CASES[0].name, "calc_01");
        assert_eq!(TASK_CASES[9].name, "calc_10");
    }

    #[test]
    fn three_configurations_in_fixed_order() {
        let configs = configs();
        assert_eq!(configs.len(), 3);
        assert_eq!(configs[0], (Mode::NoFormat, None));
        assert_eq!(
            configs[1],
            (Mode::ToolStrategy, Some(SchemaVariant::WithValidation))
        );
        assert_eq!(
            configs[2],
            (Mode::ProviderStrategy, Some(SchemaVariant::WithValidation))
        );
    }
}
