// GraphQL wire types for the pull request review query.

#[derive(Debug, serde::Serialize)]
pub struct PullRequestVars {
    pub owner: String,
    pub name: String,
    pub number: i64,
    pub review_window: i32,
    pub label_window: i32,
}

#[derive(Debug, serde::Serialize)]
pub struct GraphQlPayload<V> {
    pub query: &'static str,
    pub variables: V,
}

#[derive(Debug, serde::Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, serde::Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct PullRequestData {
    pub repository: Option<RepositoryNode>,
}

#[derive(Debug, serde::Deserialize)]
pub struct RepositoryNode {
    #[serde(rename = "pullRequest")]
    pub pull_request: Option<PullRequestNode>,
}

#[derive(Debug, serde::Deserialize)]
pub struct PullRequestNode {
    #[serde(rename = "reviewDecision")]
    pub review_decision: Option<String>,
    pub reviews: Option<ReviewsConnection>,
    pub labels: Option<LabelsConnection>,
}

#[derive(Debug, serde::Deserialize)]
pub struct ReviewsConnection {
    #[serde(rename = "totalCount")]
    pub total_count: Option<usize>,
    pub nodes: Option<Vec<ReviewNode>>,
}

#[derive(Debug, serde::Deserialize)]
pub struct ReviewNode {
    pub author: Option<Author>,
    pub state: Option<String>,
    #[serde(rename = "submittedAt")]
    pub submitted_at: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct Author {
    pub login: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct LabelsConnection {
    #[serde(rename = "totalCount")]
    pub total_count: Option<usize>,
    pub nodes: Option<Vec<LabelNode>>,
}

#[derive(Debug, serde::Deserialize)]
pub struct LabelNode {
    pub name: String,
}
