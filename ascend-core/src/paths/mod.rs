//! Learning-path roll-up - the fourth nesting level
//!
//! Path progress is derived on read from the per-course progress behind
//! each step; nothing here is persisted.

use std::collections::{HashMap, HashSet};

use ascend_models::{CourseId, LearningPath, PathProgress, StepProgress, StepStatus, UserId};

/// The per-course inputs a path roll-up reads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepInput {
    /// Course overall progress, 0-100.
    pub progress: f64,
    /// Mean mastery score across the course's concepts, when known.
    pub mastery: Option<f64>,
}

/// Derive a user's progress through a learning path.
///
/// A step is complete when its course is complete and, when the step
/// carries a minimum-mastery criterion, the mastery meets it. Steps whose
/// prerequisites are not all complete stay locked.
pub fn path_progress(
    path: &LearningPath,
    user_id: UserId,
    inputs: &HashMap<CourseId, StepInput>,
) -> PathProgress {
    let mut completed_ids: HashSet<&str> = HashSet::new();
    // First pass: completion is a property of the step itself.
    for step in &path.steps {
        let input = inputs.get(&step.course_id).copied().unwrap_or_default();
        if step_complete(step.minimum_mastery, input) {
            completed_ids.insert(step.id.as_str());
        }
    }

    let mut steps = Vec::with_capacity(path.steps.len());
    for step in &path.steps {
        let input = inputs.get(&step.course_id).copied().unwrap_or_default();
        let prerequisites_met = step
            .prerequisites
            .iter()
            .all(|p| completed_ids.contains(p.as_str()));

        let status = if completed_ids.contains(step.id.as_str()) {
            StepStatus::Completed
        } else if !prerequisites_met {
            StepStatus::Locked
        } else if input.progress > 0.0 {
            StepStatus::InProgress
        } else {
            StepStatus::Available
        };

        steps.push(StepProgress {
            step_id: step.id.clone(),
            status,
            percent: input.progress,
        });
    }

    let total = path.steps.len();
    let overall_progress = if total == 0 {
        0.0
    } else {
        100.0 * completed_ids.len() as f64 / total as f64
    };

    PathProgress {
        path_id: path.id.clone(),
        user_id,
        steps,
        overall_progress,
        completed: total > 0 && completed_ids.len() == total,
    }
}

fn step_complete(minimum_mastery: Option<f64>, input: StepInput) -> bool {
    if input.progress < 100.0 {
        return false;
    }
    match minimum_mastery {
        Some(required) => input.mastery.is_some_and(|m| m >= required),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascend_models::{PathId, PathStep};

    fn step(id: &str, prerequisites: &[&str], minimum_mastery: Option<f64>) -> PathStep {
        PathStep {
            id: id.into(),
            title: id.into(),
            course_id: CourseId::new(id),
            prerequisites: prerequisites.iter().map(|s| s.to_string()).collect(),
            minimum_mastery,
        }
    }

    fn path() -> LearningPath {
        LearningPath {
            id: PathId::new("backend"),
            title: "Backend".into(),
            steps: vec![
                step("basics", &[], None),
                step("apis", &["basics"], Some(60.0)),
                step("systems", &["apis"], None),
            ],
        }
    }

    fn inputs(entries: &[(&str, f64, Option<f64>)]) -> HashMap<CourseId, StepInput> {
        entries
            .iter()
            .map(|&(id, progress, mastery)| {
                (CourseId::new(id), StepInput { progress, mastery })
            })
            .collect()
    }

    #[test]
    fn prerequisites_gate_later_steps() {
        let p = path();
        let result = path_progress(&p, UserId::new("u1"), &inputs(&[]));

        assert_eq!(result.steps[0].status, StepStatus::Available);
        assert_eq!(result.steps[1].status, StepStatus::Locked);
        assert_eq!(result.steps[2].status, StepStatus::Locked);
        assert_eq!(result.overall_progress, 0.0);
    }

    #[test]
    fn completed_course_completes_its_step() {
        let p = path();
        let result = path_progress(
            &p,
            UserId::new("u1"),
            &inputs(&[("basics", 100.0, None), ("apis", 30.0, None)]),
        );

        assert_eq!(result.steps[0].status, StepStatus::Completed);
        assert_eq!(result.steps[1].status, StepStatus::InProgress);
        assert!((result.overall_progress - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn mastery_criterion_holds_back_completion() {
        let p = path();
        let below = path_progress(
            &p,
            UserId::new("u1"),
            &inputs(&[("basics", 100.0, None), ("apis", 100.0, Some(45.0))]),
        );
        assert_eq!(below.steps[1].status, StepStatus::InProgress);

        let met = path_progress(
            &p,
            UserId::new("u1"),
            &inputs(&[("basics", 100.0, None), ("apis", 100.0, Some(75.0))]),
        );
        assert_eq!(met.steps[1].status, StepStatus::Completed);
    }

    #[test]
    fn full_path_completes() {
        let p = path();
        let result = path_progress(
            &p,
            UserId::new("u1"),
            &inputs(&[
                ("basics", 100.0, None),
                ("apis", 100.0, Some(80.0)),
                ("systems", 100.0, None),
            ]),
        );
        assert!(result.completed);
        assert_eq!(result.overall_progress, 100.0);
    }
}
