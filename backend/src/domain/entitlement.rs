//! Entitlement graph and its traversal.
//!
//! Entitlements are directed edges between nodes: a user is granted a role,
//! a role grants badges and paints, a special event or a purchased product
//! grants anything. The entitlements of a user are every node reachable from
//! that user and from the global default group, following only edges whose
//! condition holds for the user's purchase facts.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{BadgeId, EmoteSetId, PaintId, RoleId, SpecialEventId, UserId};

/// Validation errors raised by entitlement constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntitlementValidationError {
    #[error("product id must not be empty")]
    EmptyProductId,
    #[error("product id must not contain surrounding whitespace")]
    ProductIdWhitespace,
}

/// Billing product identifier, as issued by the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// Validate and construct a [`ProductId`].
    pub fn new(value: impl Into<String>) -> Result<Self, EntitlementValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(EntitlementValidationError::EmptyProductId);
        }
        if value.trim() != value {
            return Err(EntitlementValidationError::ProductIdWhitespace);
        }
        Ok(Self(value))
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ProductId> for String {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ProductId {
    type Error = EntitlementValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Kind of an entitlement node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementEdgeKind {
    User,
    Role,
    Badge,
    Paint,
    EmoteSet,
    Product,
    SpecialEvent,
    Subscription,
    GlobalDefaultEntitlementGroup,
}

/// Endpoint of an entitlement edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntitlementNode {
    User(UserId),
    Role(RoleId),
    Badge(BadgeId),
    Paint(PaintId),
    EmoteSet(EmoteSetId),
    Product(ProductId),
    SpecialEvent(SpecialEventId),
    /// An active subscription to the given product.
    Subscription(ProductId),
    /// Granted to every user.
    GlobalDefaultEntitlementGroup,
}

impl EntitlementNode {
    /// Kind of this node.
    pub fn kind(&self) -> EntitlementEdgeKind {
        match self {
            Self::User(_) => EntitlementEdgeKind::User,
            Self::Role(_) => EntitlementEdgeKind::Role,
            Self::Badge(_) => EntitlementEdgeKind::Badge,
            Self::Paint(_) => EntitlementEdgeKind::Paint,
            Self::EmoteSet(_) => EntitlementEdgeKind::EmoteSet,
            Self::Product(_) => EntitlementEdgeKind::Product,
            Self::SpecialEvent(_) => EntitlementEdgeKind::SpecialEvent,
            Self::Subscription(_) => EntitlementEdgeKind::Subscription,
            Self::GlobalDefaultEntitlementGroup => {
                EntitlementEdgeKind::GlobalDefaultEntitlementGroup
            }
        }
    }
}

/// What keeps an edge alive; removing the manager removes the edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntitlementManagedBy {
    SpecialEvent(SpecialEventId),
    Subscription(ProductId),
    Purchase(ProductId),
}

/// Comparison operator of a condition leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    fn apply(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Neq => lhs != rhs,
            Self::Gt => lhs > rhs,
            Self::Gte => lhs >= rhs,
            Self::Lt => lhs < rhs,
            Self::Lte => lhs <= rhs,
        }
    }
}

/// Numeric fact about the user that conditions compare against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "fact", content = "product", rename_all = "snake_case")]
pub enum Fact {
    /// Months subscribed to the product, `0` when never subscribed.
    SubscriptionMonths(ProductId),
    /// `1` when a purchase of the product completed, otherwise `0`.
    PurchaseCompleted(ProductId),
}

/// Condition tree attached to an edge.
///
/// # Examples
/// ```
/// use emote_portal::domain::{Comparison, EntitlementCondition, EntitlementFacts, Fact, ProductId};
///
/// let product = ProductId::new("prod_sub").expect("valid product");
/// let condition = EntitlementCondition::Compare {
///     op: Comparison::Gte,
///     fact: Fact::SubscriptionMonths(product.clone()),
///     value: 12,
/// };
/// let facts = EntitlementFacts::default().with_subscription_months(product, 13);
/// assert!(condition.evaluate(&facts));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntitlementCondition {
    And { conditions: Vec<Self> },
    Or { conditions: Vec<Self> },
    Not { condition: Box<Self> },
    Compare { op: Comparison, fact: Fact, value: i64 },
}

impl EntitlementCondition {
    /// Evaluate the tree. An empty `And` holds and an empty `Or` does not.
    pub fn evaluate(&self, facts: &EntitlementFacts) -> bool {
        match self {
            Self::And { conditions } => conditions.iter().all(|c| c.evaluate(facts)),
            Self::Or { conditions } => conditions.iter().any(|c| c.evaluate(facts)),
            Self::Not { condition } => !condition.evaluate(facts),
            Self::Compare { op, fact, value } => op.apply(facts.value(fact), *value),
        }
    }
}

/// Purchase and subscription facts used to evaluate edge conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementFacts {
    #[serde(default)]
    pub subscription_months: HashMap<ProductId, u32>,
    #[serde(default)]
    pub completed_purchases: HashSet<ProductId>,
}

impl EntitlementFacts {
    /// Record `months` of subscription to `product`.
    pub fn with_subscription_months(mut self, product: ProductId, months: u32) -> Self {
        self.subscription_months.insert(product, months);
        self
    }

    /// Record a completed purchase of `product`.
    pub fn with_purchase(mut self, product: ProductId) -> Self {
        self.completed_purchases.insert(product);
        self
    }

    /// Current value of `fact`.
    pub fn value(&self, fact: &Fact) -> i64 {
        match fact {
            Fact::SubscriptionMonths(product) => self
                .subscription_months
                .get(product)
                .copied()
                .map_or(0, i64::from),
            Fact::PurchaseCompleted(product) => {
                i64::from(self.completed_purchases.contains(product))
            }
        }
    }
}

/// Directed grant from one node to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementEdge {
    pub from: EntitlementNode,
    pub to: EntitlementNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<EntitlementManagedBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<EntitlementCondition>,
}

impl EntitlementEdge {
    /// Unconditional, unmanaged edge.
    pub fn new(from: EntitlementNode, to: EntitlementNode) -> Self {
        Self {
            from,
            to,
            managed_by: None,
            condition: None,
        }
    }

    /// Attach a manager.
    pub fn managed_by(mut self, manager: EntitlementManagedBy) -> Self {
        self.managed_by = Some(manager);
        self
    }

    /// Attach a condition.
    pub fn when(mut self, condition: EntitlementCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    fn holds(&self, facts: &EntitlementFacts) -> bool {
        self.condition
            .as_ref()
            .is_none_or(|condition| condition.evaluate(facts))
    }
}

/// Outbound adjacency index over a set of edges.
#[derive(Debug, Clone, Default)]
pub struct EntitlementGraph {
    outbound: HashMap<EntitlementNode, Vec<EntitlementEdge>>,
}

impl EntitlementGraph {
    /// Index `edges` by their source node, preserving their order.
    pub fn new(edges: impl IntoIterator<Item = EntitlementEdge>) -> Self {
        let mut outbound: HashMap<EntitlementNode, Vec<EntitlementEdge>> = HashMap::new();
        for edge in edges {
            outbound.entry(edge.from.clone()).or_default().push(edge);
        }
        Self { outbound }
    }

    /// Edges leaving `node`.
    pub fn outbound(&self, node: &EntitlementNode) -> &[EntitlementEdge] {
        self.outbound
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// A collected entitlement and the edge it was first reached through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant<T> {
    pub id: T,
    /// Node the grant was reached from.
    pub via: EntitlementNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<EntitlementManagedBy>,
}

/// Everything a user is entitled to, in breadth-first discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedEntitlements {
    pub roles: Vec<Grant<RoleId>>,
    pub badges: Vec<Grant<BadgeId>>,
    pub paints: Vec<Grant<PaintId>>,
    pub emote_sets: Vec<Grant<EmoteSetId>>,
    pub products: Vec<Grant<ProductId>>,
    pub special_events: Vec<Grant<SpecialEventId>>,
}

impl CalculatedEntitlements {
    /// Granted role identifiers.
    pub fn role_ids(&self) -> impl Iterator<Item = &RoleId> {
        self.roles.iter().map(|grant| &grant.id)
    }

    /// Whether `badge` is granted.
    pub fn has_badge(&self, badge: &BadgeId) -> bool {
        self.badges.iter().any(|grant| &grant.id == badge)
    }

    /// Whether `paint` is granted.
    pub fn has_paint(&self, paint: &PaintId) -> bool {
        self.paints.iter().any(|grant| &grant.id == paint)
    }

    fn record(&mut self, node: &EntitlementNode, edge: &EntitlementEdge) {
        let via = edge.from.clone();
        let managed_by = edge.managed_by.clone();
        match node {
            EntitlementNode::Role(id) => self.roles.push(Grant {
                id: id.clone(),
                via,
                managed_by,
            }),
            EntitlementNode::Badge(id) => self.badges.push(Grant {
                id: id.clone(),
                via,
                managed_by,
            }),
            EntitlementNode::Paint(id) => self.paints.push(Grant {
                id: id.clone(),
                via,
                managed_by,
            }),
            EntitlementNode::EmoteSet(id) => self.emote_sets.push(Grant {
                id: id.clone(),
                via,
                managed_by,
            }),
            EntitlementNode::Product(id) => self.products.push(Grant {
                id: id.clone(),
                via,
                managed_by,
            }),
            EntitlementNode::SpecialEvent(id) => self.special_events.push(Grant {
                id: id.clone(),
                via,
                managed_by,
            }),
            EntitlementNode::User(_)
            | EntitlementNode::Subscription(_)
            | EntitlementNode::GlobalDefaultEntitlementGroup => {}
        }
    }
}

/// Calculate the entitlements of `user`.
///
/// Traversal is breadth first from the user and the global default group.
/// Each node is visited once, so cycles terminate and every grant keeps the
/// first edge that reached it.
pub fn calculate(
    user: &UserId,
    graph: &EntitlementGraph,
    facts: &EntitlementFacts,
) -> CalculatedEntitlements {
    calculate_from(
        [
            EntitlementNode::User(user.clone()),
            EntitlementNode::GlobalDefaultEntitlementGroup,
        ],
        graph,
        facts,
    )
}

/// Calculate everything reachable from `roots`.
pub fn calculate_from(
    roots: impl IntoIterator<Item = EntitlementNode>,
    graph: &EntitlementGraph,
    facts: &EntitlementFacts,
) -> CalculatedEntitlements {
    let mut result = CalculatedEntitlements::default();
    let mut visited: HashSet<EntitlementNode> = HashSet::new();
    let mut queue: VecDeque<EntitlementNode> = VecDeque::new();

    for root in roots {
        if visited.insert(root.clone()) {
            queue.push_back(root);
        }
    }

    while let Some(node) = queue.pop_front() {
        for edge in graph.outbound(&node) {
            if !edge.holds(facts) {
                trace!(from = ?edge.from, to = ?edge.to, "edge condition not met");
                continue;
            }
            if visited.insert(edge.to.clone()) {
                result.record(&edge.to, edge);
                queue.push_back(edge.to.clone());
            }
        }
    }
    result
}
