use crate::{Directory, Post, Profile, Result, SocialError, Username};

/// Read-only view of the directory from one user's point of view.
pub struct SessionView<'a> {
    directory: &'a Directory,
    viewer: &'a Profile,
}

impl<'a> SessionView<'a> {
    pub fn new(directory: &'a Directory, viewer: &Username) -> Result<Self> {
        let viewer = directory.find(viewer)?;
        Ok(Self { directory, viewer })
    }

    pub fn viewer(&self) -> &'a Username {
        self.viewer.username()
    }

    pub fn can_see_posts(&self, owner: &Username) -> Result<bool> {
        Ok(self.owner(owner)?.can_see_posts(self.viewer()))
    }

    pub fn can_like_posts(&self, owner: &Username) -> Result<bool> {
        Ok(self.owner(owner)?.can_like_posts(self.viewer()))
    }

    /// `owner`'s posts, or `None` when the viewer is not allowed to see them.
    pub fn visible_posts(&self, owner: &Username) -> Result<Option<&'a [Post]>> {
        let owner = self.owner(owner)?;
        Ok(owner.can_see_posts(self.viewer()).then(|| owner.posts()))
    }

    pub fn own_posts(&self) -> &'a [Post] {
        self.viewer.posts()
    }

    pub fn friends(&self) -> &'a [Username] {
        self.viewer.friends()
    }

    /// Friend at `index` in friend-list order.
    pub fn friend_at(&self, index: usize) -> Option<&'a Username> {
        self.viewer.friends().get(index)
    }

    pub fn pending_requests(&self) -> &'a [Username] {
        self.viewer.incoming_requests()
    }

    pub fn sent_requests(&self) -> &'a [Username] {
        self.viewer.outgoing_requests()
    }

    /// Posts of every friend whose posts the viewer may see, in friend-list
    /// order.
    pub fn friend_feed(&self) -> Vec<(&'a Username, &'a [Post])> {
        self.viewer
            .friends()
            .iter()
            .filter_map(|friend| self.directory.find(friend).ok())
            .filter(|profile| profile.can_see_posts(self.viewer()))
            .map(|profile| (profile.username(), profile.posts()))
            .collect()
    }

    fn owner(&self, owner: &Username) -> Result<&'a Profile> {
        self.directory
            .find(owner)
            .map_err(|_| SocialError::InvalidUser(owner.clone()))
    }
}
