use uuid::Uuid;

/// How a query constrains the document owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerFilter {
    /// No constraint.
    #[default]
    Any,
    /// Only documents without an owner.
    Unowned,
    /// Only documents owned by this principal.
    Is(Uuid),
    /// Documents without an owner, or owned by this principal.
    UnownedOr(Uuid),
}

impl OwnerFilter {
    /// Returns true if a document with `owner` passes the filter.
    pub fn matches(&self, owner: Option<Uuid>) -> bool {
        match self {
            OwnerFilter::Any => true,
            OwnerFilter::Unowned => owner.is_none(),
            OwnerFilter::Is(id) => owner == Some(*id),
            OwnerFilter::UnownedOr(id) => owner.is_none() || owner == Some(*id),
        }
    }
}

/// Result ordering by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    OldestFirst,
    NewestFirst,
}

/// Builder for constructing document queries.
#[derive(Debug, Clone)]
pub struct DocumentQuery {
    /// Collection to search.
    pub collection: String,

    /// Owner constraint.
    pub owner: OwnerFilter,

    /// Filter by status tag.
    pub status: Option<String>,

    /// Result ordering.
    pub order: SortOrder,

    /// Maximum number of documents to return.
    pub limit: Option<usize>,

    /// Number of documents to skip.
    pub offset: Option<usize>,
}

impl DocumentQuery {
    /// Creates a query over every document of a collection.
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            owner: OwnerFilter::Any,
            status: None,
            order: SortOrder::OldestFirst,
            limit: None,
            offset: None,
        }
    }

    pub fn owner(mut self, owner: OwnerFilter) -> Self {
        self.owner = owner;
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.order = SortOrder::NewestFirst;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_filter_matches() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(OwnerFilter::Any.matches(Some(other)));
        assert!(OwnerFilter::Unowned.matches(None));
        assert!(!OwnerFilter::Unowned.matches(Some(me)));
        assert!(OwnerFilter::Is(me).matches(Some(me)));
        assert!(!OwnerFilter::Is(me).matches(None));
        assert!(OwnerFilter::UnownedOr(me).matches(None));
        assert!(OwnerFilter::UnownedOr(me).matches(Some(me)));
        assert!(!OwnerFilter::UnownedOr(me).matches(Some(other)));
    }

    #[test]
    fn query_builder_chain() {
        let owner = Uuid::new_v4();
        let query = DocumentQuery::collection("orders")
            .owner(OwnerFilter::Is(owner))
            .status("Received")
            .newest_first()
            .limit(10)
            .offset(5);

        assert_eq!(query.collection, "orders");
        assert_eq!(query.owner, OwnerFilter::Is(owner));
        assert_eq!(query.status.as_deref(), Some("Received"));
        assert_eq!(query.order, SortOrder::NewestFirst);
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.offset, Some(5));
    }
}
