use pulse_domain::ActivationSnapshot;

pub(super) const ANOMALY_SYSTEM_PROMPT: &str = "You are an analytics anomaly detector specializing in SaaS metrics.

When D7 Activation rates drop below threshold, you identify root causes and suggest actionable fixes.

Be specific and data-driven. Focus on:
1. Funnel drop-offs (which step loses most users?)
2. Onboarding UX issues (friction points, unclear CTAs)
3. Event tracking gaps (missing properties, misconfigurations)

Format: [Root Cause] → [Actionable Fix] → [Expected Impact]";

pub(super) const PDR_SYSTEM_PROMPT: &str = "You are a data analyst specializing in summarizing key metrics into a One Metric That Matters (OMTM) and 2 guardrails for decision-making.

Format your response as a PDR (Progress/Decision/Review) card:
1. OMTM: The single most important metric to track (justify why)
2. Guardrail 1: A leading indicator metric
3. Guardrail 2: A lagging indicator metric
4. Decision: If [condition] then [action], else [alternative action]";

const EVENTS_SCHEMA: &str = "Database: PostgreSQL
Table: events_d7_new
Columns:
- id: bigserial primary key
- event: text (workspace_created, project_created, task_completed, invite_sent, invite_accepted)
- distinct_id: text
- timestamp: timestamptz
- properties: jsonb (contains workspace_id, project_id, task_id, etc.)
- workspace_id: text (derived from properties->>'workspace_id')

Example D7 query structure:
- CTE with workspace cohorts by week
- Window functions for 7-day activation
- Filter for project_created >= 1 AND task_completed >= 3";

pub(super) fn sql_system_prompt() -> String {
    format!(
        "You are a SQL expert specializing in PostgreSQL queries for analytics.

{EVENTS_SCHEMA}

Guidelines:
- Use workspace-level aggregation
- Include proper JSONB operators (->, ->>)
- Add comments for complex logic
- Return only valid SQL, no markdown formatting"
    )
}

pub(super) fn anomaly_prompt(snapshot: &ActivationSnapshot, threshold: f64) -> String {
    let rate = percent(snapshot.activation_rate());
    format!(
        "D7 Activation Rate dropped to {rate:.1}%, below threshold of {threshold:.0}%.

Current metrics:
- Total workspaces: {total}
- Activated (project + 3 tasks): {activated}
- Activation rate: {rate:.1}%

Analyze and provide:
1. Root cause hypothesis (most likely reason for drop)
2. Specific actionable fix
3. Expected impact on activation rate",
        threshold = percent(threshold),
        total = snapshot.total_workspaces(),
        activated = snapshot.activated_count(),
    )
}

pub(super) fn pdr_prompt(snapshot: &ActivationSnapshot) -> String {
    format!(
        "Given these D7 Activation metrics:
- Total workspaces: {total}
- Activated (project + 3 tasks): {activated}
- D7 Activation Rate: {rate:.1}%

Generate a concise PDR card following the format above. Be specific and actionable.",
        total = snapshot.total_workspaces(),
        activated = snapshot.activated_count(),
        rate = percent(snapshot.activation_rate()),
    )
}

pub(super) fn percent(ratio: f64) -> f64 {
    ratio * 100.0
}
