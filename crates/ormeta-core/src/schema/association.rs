use super::{Catalog, Member, MemberId, MetaType, TypeId};

/// Relationship between the member's declaring type and another mapped type.
///
/// Keys are listed pairwise: `this_key[i]` on this side matches
/// `other_key[i]` on the other side.
#[derive(Debug, Clone, PartialEq)]
pub struct Association {
    /// The association member itself
    pub this_member: MemberId,

    /// Type declaring the association member
    pub this_type: TypeId,

    /// Type on the other side of the relationship
    pub other_type: TypeId,

    /// Key members on this side
    pub this_key: Vec<MemberId>,

    /// Key members on the other side
    pub other_key: Vec<MemberId>,

    /// The association on the other type that pairs with this one, if any
    pub other_member: Option<MemberId>,

    /// True if `this_key` is a foreign key referencing `other_key`
    pub is_foreign_key: bool,

    /// True if the association yields many instances of the other type
    pub is_many: bool,

    /// True if any of `this_key` can be null
    pub is_nullable: bool,

    /// True if the relationship is one-to-one
    pub is_unique: bool,

    /// Database delete rule, such as `CASCADE`
    pub delete_rule: Option<String>,

    /// Delete the dependent row when the foreign key is set to null
    pub delete_on_null: bool,
}

impl Association {
    pub fn other_type<'a>(&self, catalog: &'a Catalog) -> &'a MetaType {
        catalog.ty(self.other_type)
    }

    pub fn this_key_members<'a>(
        &'a self,
        catalog: &'a Catalog,
    ) -> impl ExactSizeIterator<Item = &'a Member> + 'a {
        self.this_key.iter().map(|id| catalog.member(*id))
    }

    pub fn other_key_members<'a>(
        &'a self,
        catalog: &'a Catalog,
    ) -> impl ExactSizeIterator<Item = &'a Member> + 'a {
        self.other_key.iter().map(|id| catalog.member(*id))
    }

    /// The paired association member on the other type.
    pub fn pair<'a>(&self, catalog: &'a Catalog) -> Option<&'a Member> {
        self.other_member.map(|id| catalog.member(id))
    }

    pub fn is_self_referencing(&self) -> bool {
        self.this_type == self.other_type
    }

    /// Returns `true` if the other side's key is its primary key.
    pub fn references_primary_key(&self, catalog: &Catalog) -> bool {
        let identity: Vec<_> = self
            .other_type(catalog)
            .identity_members()
            .map(Member::id)
            .collect();

        identity == self.other_key
    }
}
