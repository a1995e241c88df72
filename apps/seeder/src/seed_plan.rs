use pulse_core::{ActorId, AppResult, WorkspaceId};
use pulse_domain::{
    EventName, SegmentPlan, SegmentSelection, WORKSPACE_ID_PROPERTY, WORKSPACE_NAME_PROPERTY,
};
use serde_json::{Map, Value, json};
use uuid::Uuid;

/// Tasks completed by every workspace that is meant to activate.
const ACTIVATING_TASKS: usize = 3;

/// One event to capture for a seeded workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedStep {
    pub event: EventName,
    pub properties: Map<String, Value>,
}

/// A seeded workspace and the funnel it walks through.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedWorkspace {
    pub index: usize,
    pub segment: SegmentSelection,
    pub workspace_id: WorkspaceId,
    pub user_id: ActorId,
    pub workspace_name: String,
    pub activates: bool,
    /// Properties shared by the group and every step.
    pub base_properties: Map<String, Value>,
    pub steps: Vec<SeedStep>,
}

/// Builds one workspace per segment combination.
///
/// The first three quarters walk the full activation funnel; the rest stop
/// after a single completed task.
pub fn build_seed_plan() -> AppResult<Vec<SeedWorkspace>> {
    let combinations = SegmentSelection::all_combinations();
    let activate_until = combinations.len() * 3 / 4;

    combinations
        .into_iter()
        .enumerate()
        .map(|(index, segment)| seed_workspace(index, segment, index < activate_until))
        .collect()
}

fn seed_workspace(
    index: usize,
    segment: SegmentSelection,
    activates: bool,
) -> AppResult<SeedWorkspace> {
    let workspace_id = WorkspaceId::generate();
    let user_id = ActorId::new(format!("seed_user_{index}"))?;
    let workspace_name = format!(
        "Seed_{}_{}_{}_{}_{index}",
        segment.plan.as_str(),
        segment.region.as_str(),
        segment.channel.as_str(),
        segment.variant.as_str()
    );

    let mut base_properties = segment.to_properties();
    let seat_count = match segment.plan {
        SegmentPlan::Pro => 5,
        SegmentPlan::Free => 2,
    };
    base_properties.insert("seat_count".to_owned(), json!(seat_count));
    base_properties.insert(
        WORKSPACE_ID_PROPERTY.to_owned(),
        json!(workspace_id.as_str()),
    );
    base_properties.insert(WORKSPACE_NAME_PROPERTY.to_owned(), json!(workspace_name));

    let project_id = format!("pr_seed_{index}");
    let mut steps = vec![step(&base_properties, EventName::WorkspaceCreated, [])];
    if activates {
        steps.push(step(
            &base_properties,
            EventName::ProjectCreated,
            [("project_id", json!(project_id))],
        ));
        for task in 0..ACTIVATING_TASKS {
            steps.push(step(
                &base_properties,
                EventName::TaskCompleted,
                [
                    ("task_id", json!(format!("task_seed_{index}_{task}"))),
                    ("project_id", json!(project_id)),
                ],
            ));
        }
        steps.push(step(&base_properties, EventName::InviteSent, []));
        steps.push(step(&base_properties, EventName::InviteAccepted, []));
    } else {
        steps.push(step(
            &base_properties,
            EventName::TaskCompleted,
            [
                ("task_id", json!(format!("task_seed_{index}_0"))),
                ("project_id", json!(project_id)),
            ],
        ));
    }

    Ok(SeedWorkspace {
        index,
        segment,
        workspace_id,
        user_id,
        workspace_name,
        activates,
        base_properties,
        steps,
    })
}

fn step<const N: usize>(
    base_properties: &Map<String, Value>,
    event: EventName,
    extra: [(&str, Value); N],
) -> SeedStep {
    let mut properties = base_properties.clone();
    for (key, value) in extra {
        properties.insert(key.to_owned(), value);
    }
    properties.insert("event_uuid".to_owned(), json!(Uuid::new_v4().to_string()));

    SeedStep { event, properties }
}
