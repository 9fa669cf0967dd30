//! Capability tags.
//!
//! Every simulated entity carries a `TagSet`, and so does its collider. The two sets are
//! independent: an inactive spikes trap has no tags on either, a turret is `Enemy + Dangerous`
//! while its collider is only `Dangerous`. Collision queries filter by **superset** on both.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Wall,
    Dangerous,
    DangerousForEnemy,
    Indestructible,
    OneHit,
    Bullet,
    Coin,
    AidKit,
    ItemSpawner,
    Character,
    Enemy,
}

impl Tag {
    pub const ALL: [Tag; 11] = [
        Tag::Wall,
        Tag::Dangerous,
        Tag::DangerousForEnemy,
        Tag::Indestructible,
        Tag::OneHit,
        Tag::Bullet,
        Tag::Coin,
        Tag::AidKit,
        Tag::ItemSpawner,
        Tag::Character,
        Tag::Enemy,
    ];

    #[inline]
    const fn bit(self) -> u16 {
        1 << self as u8
    }
}

/// Bitset of [`Tag`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TagSet(u16);

impl TagSet {
    pub const EMPTY: TagSet = TagSet(0);

    pub const fn of(tags: &[Tag]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < tags.len() {
            bits |= tags[i].bit();
            i += 1;
        }
        Self(bits)
    }

    #[inline]
    pub const fn contains(self, tag: Tag) -> bool {
        self.0 & tag.bit() != 0
    }

    /// Superset test: every tag in `required` is present in `self`.
    #[inline]
    pub const fn contains_all(self, required: TagSet) -> bool {
        self.0 & required.0 == required.0
    }

    #[inline]
    pub const fn with(self, tag: Tag) -> Self {
        Self(self.0 | tag.bit())
    }

    #[inline]
    pub fn insert(&mut self, tag: Tag) {
        self.0 |= tag.bit();
    }

    #[inline]
    pub fn remove(&mut self, tag: Tag) {
        self.0 &= !tag.bit();
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Tag> {
        Tag::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl From<Tag> for TagSet {
    fn from(tag: Tag) -> Self {
        Self(tag.bit())
    }
}

impl fmt::Debug for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superset_semantics() {
        let bullet = TagSet::of(&[Tag::DangerousForEnemy, Tag::Indestructible, Tag::OneHit, Tag::Bullet]);

        assert!(bullet.contains_all(TagSet::EMPTY));
        assert!(bullet.contains_all(Tag::OneHit.into()));
        assert!(bullet.contains_all(TagSet::of(&[Tag::Bullet, Tag::DangerousForEnemy])));
        assert!(!bullet.contains_all(TagSet::of(&[Tag::Bullet, Tag::Wall])));
        assert!(bullet.with(Tag::Wall).contains_all(TagSet::of(&[Tag::Bullet, Tag::Wall])));
    }

    #[test]
    fn insert_and_remove_toggle_single_bits() {
        let mut set = TagSet::EMPTY;
        set.insert(Tag::Dangerous);
        set.insert(Tag::Enemy);
        assert!(set.contains(Tag::Dangerous));

        set.remove(Tag::Dangerous);
        assert!(!set.contains(Tag::Dangerous));
        assert!(set.contains(Tag::Enemy));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Tag::Enemy]);
    }
}
