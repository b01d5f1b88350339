use serde::{Deserialize, Serialize};

use crate::Username;

/// Per-profile post identifier. Unlike a post's index it survives deletions
/// of earlier posts.
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Copy, Debug, Serialize, Deserialize, Default)]
pub struct PostId(pub u64);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub text: String,
    pub likes: u64,
}

/// Social state of a single user.
///
/// Relationship lists are only mutated through the [`crate::Directory`], which
/// keeps both sides of a pair consistent. Posts belong to the owner alone and
/// are mutated directly.
#[derive(Clone, Debug)]
pub struct Profile {
    username: Username,
    outgoing_requests: Vec<Username>,
    incoming_requests: Vec<Username>,
    friends: Vec<Username>,
    posts: Vec<Post>,
    next_post_id: u64,
}

impl Profile {
    pub(crate) fn new(username: Username) -> Self {
        Self {
            username,
            outgoing_requests: Vec::new(),
            incoming_requests: Vec::new(),
            friends: Vec::new(),
            posts: Vec::new(),
            next_post_id: 0,
        }
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn friends(&self) -> &[Username] {
        &self.friends
    }

    /// Users this profile has asked to be friends with.
    pub fn outgoing_requests(&self) -> &[Username] {
        &self.outgoing_requests
    }

    /// Users waiting on this profile to answer.
    pub fn incoming_requests(&self) -> &[Username] {
        &self.incoming_requests
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn is_friend(&self, username: &Username) -> bool {
        self.friends.contains(username)
    }

    pub fn has_request_from(&self, username: &Username) -> bool {
        self.incoming_requests.contains(username)
    }

    pub fn has_request_to(&self, username: &Username) -> bool {
        self.outgoing_requests.contains(username)
    }

    pub fn can_see_posts(&self, viewer: &Username) -> bool {
        viewer == &self.username || self.is_friend(viewer)
    }

    /// The owner is deliberately excluded: only friends may like.
    pub fn can_like_posts(&self, viewer: &Username) -> bool {
        self.is_friend(viewer)
    }

    /// Appends a post with no likes and returns its position.
    pub fn add_post(&mut self, text: impl Into<String>) -> usize {
        let id = PostId(self.next_post_id);
        self.next_post_id += 1;
        self.posts.push(Post {
            id,
            text: text.into(),
            likes: 0,
        });
        self.posts.len() - 1
    }

    /// Removes the post at `index`; later posts move down by one. Out of range
    /// indices are ignored and `false` is returned.
    pub fn delete_post(&mut self, index: usize) -> bool {
        if index >= self.posts.len() {
            return false;
        }
        self.posts.remove(index);
        true
    }

    /// Out of range indices are ignored and `false` is returned.
    pub fn like_post(&mut self, index: usize) -> bool {
        match self.posts.get_mut(index) {
            Some(post) => {
                post.likes += 1;
                true
            }
            None => false,
        }
    }

    pub(crate) fn add_outgoing(&mut self, to: &Username) {
        push_unique(&mut self.outgoing_requests, to);
    }

    pub(crate) fn add_incoming(&mut self, from: &Username) {
        push_unique(&mut self.incoming_requests, from);
    }

    pub(crate) fn remove_outgoing(&mut self, to: &Username) -> bool {
        remove_all(&mut self.outgoing_requests, to)
    }

    pub(crate) fn remove_incoming(&mut self, from: &Username) -> bool {
        remove_all(&mut self.incoming_requests, from)
    }

    /// Records the friendship and drops any request still pending with
    /// `username`, in either direction.
    pub(crate) fn add_friend(&mut self, username: &Username) {
        push_unique(&mut self.friends, username);
        self.remove_outgoing(username);
        self.remove_incoming(username);
    }

    pub(crate) fn remove_friend(&mut self, username: &Username) -> bool {
        remove_all(&mut self.friends, username)
    }

    /// Drops every trace of `username` from the relationship lists.
    pub(crate) fn forget(&mut self, username: &Username) {
        self.remove_friend(username);
        self.remove_outgoing(username);
        self.remove_incoming(username);
    }
}

fn push_unique(list: &mut Vec<Username>, username: &Username) {
    if !list.contains(username) {
        list.push(username.clone());
    }
}

fn remove_all(list: &mut Vec<Username>, username: &Username) -> bool {
    let before = list.len();
    list.retain(|u| u != username);
    list.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> Profile {
        Profile::new(Username(name.into()))
    }

    #[test]
    fn add_post_returns_position_and_starts_unliked() {
        let mut alice = profile("alice");
        assert_eq!(alice.add_post("hi"), 0);
        assert_eq!(alice.add_post("again"), 1);
        assert_eq!(alice.posts()[0].text, "hi");
        assert!(alice.posts().iter().all(|post| post.likes == 0));
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let mut alice = profile("alice");
        alice.add_post("one");
        alice.like_post(0);
        let before = alice.posts().to_vec();

        assert!(!alice.delete_post(1));
        assert!(!alice.delete_post(usize::MAX));
        assert!(!alice.like_post(1));
        assert_eq!(alice.posts(), before.as_slice());
    }

    #[test]
    fn delete_shifts_later_indices_but_keeps_ids() {
        let mut alice = profile("alice");
        alice.add_post("a");
        alice.add_post("b");
        alice.add_post("c");
        let c_id = alice.posts()[2].id;

        assert!(alice.delete_post(0));
        assert_eq!(alice.posts()[1].text, "c");
        assert_eq!(alice.posts()[1].id, c_id);

        assert!(alice.like_post(1));
        assert_eq!(alice.posts()[1].likes, 1);
        assert!(alice.delete_post(1));

        // ids are never reused
        alice.add_post("d");
        assert_eq!(alice.posts().last().map(|p| p.id), Some(PostId(3)));
    }

    #[test]
    fn visibility_rules() {
        let mut alice = profile("alice");
        let bob = Username("bob".into());
        let carol = Username("carol".into());
        let me = alice.username().clone();

        assert!(alice.can_see_posts(&me));
        assert!(!alice.can_like_posts(&me));
        assert!(!alice.can_see_posts(&bob));

        alice.add_friend(&bob);
        assert!(alice.can_see_posts(&bob));
        assert!(alice.can_like_posts(&bob));
        assert!(!alice.can_see_posts(&carol));
        assert!(!alice.can_like_posts(&carol));
    }

    #[test]
    fn add_friend_clears_pending_both_ways() {
        let mut alice = profile("alice");
        let bob = Username("bob".into());
        alice.add_outgoing(&bob);
        alice.add_incoming(&bob);

        alice.add_friend(&bob);
        assert_eq!(alice.friends(), &[bob.clone()]);
        assert!(alice.outgoing_requests().is_empty());
        assert!(alice.incoming_requests().is_empty());

        alice.add_friend(&bob);
        assert_eq!(alice.friends().len(), 1);
    }
}
