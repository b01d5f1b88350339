//! Friend request lifecycle and the other operations that touch more than
//! one profile.
//!
//! For every pair of distinct users exactly one of these holds: no relation,
//! a request pending from one to the other, requests pending both ways, or
//! friendship. Each operation checks all of its preconditions before the
//! first write, so a refused call leaves the [`Directory`] untouched.

use tracing::debug;

use crate::{Directory, Profile, ProfileHandle, Result, SocialError, Username};

pub struct RelationshipEngine;

impl RelationshipEngine {
    /// `from` asks `to` to be friends. Repeating a pending request is a no-op;
    /// a request in the opposite direction is kept alongside it.
    pub fn send_request(directory: &mut Directory, from: &Username, to: &Username) -> Result<()> {
        let (sender, receiver) = Self::pair(directory, from, to)?;
        if sender.is_friend(to) {
            return Err(SocialError::AlreadyFriends(from.clone(), to.clone()));
        }
        sender.add_outgoing(to);
        receiver.add_incoming(from);
        debug!(%from, %to, "friend request sent");
        Ok(())
    }

    /// `accepter` takes the request `requester` sent earlier. Both become
    /// friends and any request left between them is cleared.
    pub fn accept_request(
        directory: &mut Directory,
        accepter: &Username,
        requester: &Username,
    ) -> Result<()> {
        let (receiver, sender) = Self::pair(directory, accepter, requester)?;
        if !receiver.has_request_from(requester) {
            return Err(SocialError::NoPendingRequest {
                from: requester.clone(),
                to: accepter.clone(),
            });
        }
        receiver.add_friend(requester);
        sender.add_friend(accepter);
        debug!(%accepter, %requester, "friend request accepted");
        Ok(())
    }

    /// `rejecter` turns down the request `requester` sent. The pair goes back
    /// to having no relation.
    pub fn reject_request(
        directory: &mut Directory,
        rejecter: &Username,
        requester: &Username,
    ) -> Result<()> {
        let (receiver, sender) = Self::pair(directory, rejecter, requester)?;
        if !receiver.has_request_from(requester) {
            return Err(SocialError::NoPendingRequest {
                from: requester.clone(),
                to: rejecter.clone(),
            });
        }
        receiver.remove_incoming(requester);
        sender.remove_outgoing(rejecter);
        debug!(%rejecter, %requester, "friend request rejected");
        Ok(())
    }

    /// Ends a friendship on both sides. Returns whether there was one.
    pub fn remove_friend(
        directory: &mut Directory,
        user: &Username,
        friend: &Username,
    ) -> Result<bool> {
        let (a, b) = Self::pair(directory, user, friend)?;
        let removed = a.remove_friend(friend) | b.remove_friend(user);
        debug!(%user, %friend, removed, "unfriended");
        Ok(removed)
    }

    pub fn delete_user(directory: &mut Directory, username: &Username) -> Result<()> {
        directory.remove(username).map(|_| ())
    }

    pub fn add_post(
        directory: &mut Directory,
        owner: &Username,
        text: impl Into<String>,
    ) -> Result<usize> {
        let index = directory.find_mut(owner)?.add_post(text);
        debug!(%owner, index, "post added");
        Ok(index)
    }

    pub fn delete_post(directory: &mut Directory, owner: &Username, index: usize) -> Result<bool> {
        Ok(directory.find_mut(owner)?.delete_post(index))
    }

    /// `owner` likes one of their own posts. No friendship is involved, so
    /// this bypasses `can_like_posts`; an out of range index yields `false`.
    pub fn like_own_post(
        directory: &mut Directory,
        owner: &Username,
        index: usize,
    ) -> Result<bool> {
        let liked = directory.find_mut(owner)?.like_post(index);
        debug!(%owner, index, liked, "own post liked");
        Ok(liked)
    }

    /// `viewer` likes the post at `index` on `owner`'s profile. Only friends
    /// may like; an out of range index is ignored and yields `false`.
    pub fn like_post(
        directory: &mut Directory,
        viewer: &Username,
        owner: &Username,
        index: usize,
    ) -> Result<bool> {
        if !directory.contains(viewer) {
            return Err(SocialError::InvalidUser(viewer.clone()));
        }
        let profile = directory
            .find_mut(owner)
            .map_err(|_| SocialError::InvalidUser(owner.clone()))?;
        if !profile.can_like_posts(viewer) {
            return Err(SocialError::CannotLike {
                viewer: viewer.clone(),
                owner: owner.clone(),
            });
        }
        Ok(profile.like_post(index))
    }

    /// Resolves two distinct users for a joint mutation.
    fn pair<'a>(
        directory: &'a mut Directory,
        a: &Username,
        b: &Username,
    ) -> Result<(&'a mut Profile, &'a mut Profile)> {
        let first = Self::resolve(directory, a)?;
        let second = Self::resolve(directory, b)?;
        if first == second {
            return Err(SocialError::SelfRequest(a.clone()));
        }
        directory
            .pair_mut(first, second)
            .ok_or_else(|| SocialError::InvalidUser(b.clone()))
    }

    fn resolve(directory: &Directory, username: &Username) -> Result<ProfileHandle> {
        directory
            .handle(username)
            .map_err(|_| SocialError::InvalidUser(username.clone()))
    }
}
