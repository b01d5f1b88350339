//! Line-oriented front end over a [`SharedDirectory`].

use nexus_social::{Post, SharedDirectory, SocialError, UserRecord, UserStore, Username};
use tracing::warn;

pub const WELCOME: &str = "--- Welcome to nexus social ---\nType `help` for commands.\n";

const GUEST_HELP: &str = "\
register <user> <password>   create an account
login <user> <password>      start a session
search <user>                check whether a user exists
users                        list every user
delete <user>                remove a user and every reference to them
quit                         save and exit";

const SESSION_HELP: &str = "\
requests                     show pending friend requests
sent                         show requests you have sent
send <user>                  send a friend request
accept <user>                accept a pending request
reject <user>                reject a pending request
friends                      show your friend list
unfriend <user>              end a friendship
post <text...>               add a post
delete-post <index>          delete one of your posts
posts                        show your posts
like-own <index>             like one of your own posts
feed                         show your friends' posts
like <friend> <post>         like a friend's post, both by index
logout                       end the session";

pub enum Reply {
    Text(String),
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Register { user: String, password: String },
    Login { user: String, password: String },
    Search(String),
    Users,
    Delete(String),
    Help,
    Quit,
    Requests,
    Sent,
    Send(String),
    Accept(String),
    Reject(String),
    Friends,
    Unfriend(String),
    Post(String),
    DeletePost(i64),
    Posts,
    LikeOwn(i64),
    Feed,
    Like { friend: i64, post: i64 },
    Logout,
}

impl Command {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        let one = |usage: &str| match args.as_slice() {
            [arg] => Ok(arg.to_string()),
            _ => Err(format!("usage: {usage}")),
        };
        let index = |arg: &str| {
            arg.parse::<i64>()
                .map_err(|_| format!("{arg:?} is not an index"))
        };

        Ok(match word {
            "register" | "login" => match args.as_slice() {
                [user, password] if word == "register" => Command::Register {
                    user: user.to_string(),
                    password: password.to_string(),
                },
                [user, password] => Command::Login {
                    user: user.to_string(),
                    password: password.to_string(),
                },
                _ => return Err(format!("usage: {word} <user> <password>")),
            },
            "search" => Command::Search(one("search <user>")?),
            "users" => Command::Users,
            "delete" => Command::Delete(one("delete <user>")?),
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "requests" => Command::Requests,
            "sent" => Command::Sent,
            "send" => Command::Send(one("send <user>")?),
            "accept" => Command::Accept(one("accept <user>")?),
            "reject" => Command::Reject(one("reject <user>")?),
            "friends" => Command::Friends,
            "unfriend" => Command::Unfriend(one("unfriend <user>")?),
            "post" if !rest.is_empty() => Command::Post(rest.to_string()),
            "post" => return Err("usage: post <text...>".to_string()),
            "delete-post" => Command::DeletePost(index(&one("delete-post <index>")?)?),
            "posts" => Command::Posts,
            "like-own" => Command::LikeOwn(index(&one("like-own <index>")?)?),
            "feed" => Command::Feed,
            "like" => match args.as_slice() {
                [friend, post] => Command::Like {
                    friend: index(friend)?,
                    post: index(post)?,
                },
                _ => return Err("usage: like <friend> <post>".to_string()),
            },
            "logout" => Command::Logout,
            other => return Err(format!("unknown command {other:?}, try `help`")),
        })
    }

    fn needs_session(&self) -> bool {
        !matches!(
            self,
            Command::Register { .. }
                | Command::Login { .. }
                | Command::Search(_)
                | Command::Users
                | Command::Delete(_)
                | Command::Help
                | Command::Quit
        )
    }
}

pub struct Shell<S> {
    directory: SharedDirectory,
    credentials: Vec<UserRecord>,
    store: S,
    session: Option<Username>,
}

impl<S> Shell<S>
where
    S: UserStore<Error = anyhow::Error>,
{
    pub fn new(store: S, credentials: Vec<UserRecord>) -> Self {
        let directory = SharedDirectory::seed(&credentials);
        let mut seen = Vec::new();
        let credentials = credentials
            .into_iter()
            .filter(|record| {
                let fresh = !seen.contains(&record.username);
                seen.push(record.username.clone());
                fresh
            })
            .collect();
        Self {
            directory,
            credentials,
            store,
            session: None,
        }
    }

    pub fn prompt(&self) -> String {
        match &self.session {
            Some(user) => format!("{user}> "),
            None => "> ".to_string(),
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.store.save_all(&self.credentials)
    }

    pub async fn handle(&mut self, line: &str) -> Reply {
        if line.trim().is_empty() {
            return Reply::Text(String::new());
        }
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(usage) => return Reply::Text(usage),
        };
        if command == Command::Quit {
            return Reply::Quit;
        }
        let text = match self.session.clone() {
            None if command.needs_session() => Ok("log in first".to_string()),
            session => self.run(command, session).await,
        };
        Reply::Text(text.unwrap_or_else(|error| {
            warn!(%error, "command refused");
            error.to_string()
        }))
    }

    async fn run(
        &mut self,
        command: Command,
        session: Option<Username>,
    ) -> Result<String, SocialError> {
        let me = session.unwrap_or_default();
        match command {
            Command::Register { user, password } => self.register(&user, password).await,
            Command::Login { user, password } => self.login(&user, &password).await,
            Command::Search(user) => {
                let found = self.directory.read(|d| d.contains(&Username(user.clone()))).await;
                Ok(if found { format!("{user} found") } else { format!("{user} not found") })
            }
            Command::Users => Ok(render_names("users", &self.directory.list_all().await)),
            Command::Delete(user) => self.delete(&Username(user)).await,
            Command::Help => Ok(match self.session {
                Some(_) => SESSION_HELP.to_string(),
                None => GUEST_HELP.to_string(),
            }),
            Command::Quit => Ok(String::new()),
            Command::Requests => {
                let pending = self.directory.view(&me, |v| v.pending_requests().to_vec()).await?;
                Ok(render_names("pending friend requests", &pending))
            }
            Command::Sent => {
                let sent = self.directory.view(&me, |v| v.sent_requests().to_vec()).await?;
                Ok(render_names("sent friend requests", &sent))
            }
            Command::Send(user) => {
                self.directory.send_request(&me, &Username(user.clone())).await?;
                Ok(format!("friend request sent to {user}"))
            }
            Command::Accept(user) => {
                self.directory.accept_request(&me, &Username(user.clone())).await?;
                Ok(format!("you and {user} are now friends"))
            }
            Command::Reject(user) => {
                self.directory.reject_request(&me, &Username(user.clone())).await?;
                Ok(format!("rejected request from {user}"))
            }
            Command::Friends => {
                let friends = self.directory.view(&me, |v| v.friends().to_vec()).await?;
                Ok(render_names("friends", &friends))
            }
            Command::Unfriend(user) => {
                if self.directory.remove_friend(&me, &Username(user.clone())).await? {
                    Ok(format!("{user} removed from friends"))
                } else {
                    Ok(format!("{user} is not your friend"))
                }
            }
            Command::Post(text) => {
                let index = self.directory.add_post(&me, text).await?;
                Ok(format!("post added at index {index}"))
            }
            Command::DeletePost(index) => {
                let deleted = match usize::try_from(index) {
                    Ok(i) => self.directory.delete_post(&me, i).await?,
                    Err(_) => false,
                };
                Ok(if deleted {
                    "post deleted".to_string()
                } else {
                    format!("no post at index {index}")
                })
            }
            Command::Posts => {
                let posts = self.directory.view(&me, |v| v.own_posts().to_vec()).await?;
                Ok(render_posts(&posts))
            }
            Command::LikeOwn(index) => {
                let liked = match usize::try_from(index) {
                    Ok(i) => self.directory.like_own_post(&me, i).await?,
                    Err(_) => false,
                };
                Ok(if liked {
                    format!("liked your post {index}")
                } else {
                    format!("no post at index {index}")
                })
            }
            Command::Feed => {
                let feed = self
                    .directory
                    .view(&me, |v| {
                        v.friend_feed()
                            .into_iter()
                            .map(|(owner, posts)| (owner.clone(), posts.to_vec()))
                            .collect::<Vec<_>>()
                    })
                    .await?;
                if feed.is_empty() {
                    return Ok("you have no friends to see posts from".to_string());
                }
                let sections: Vec<String> = feed
                    .into_iter()
                    .map(|(owner, posts)| {
                        format!("--- {owner}'s posts ---\n{}", render_posts(&posts))
                    })
                    .collect();
                Ok(sections.join("\n"))
            }
            Command::Like { friend, post } => {
                let owner = self
                    .directory
                    .view(&me, |v| {
                        let index = usize::try_from(friend).ok()?;
                        v.friend_at(index).cloned()
                    })
                    .await?;
                let Some(owner) = owner else {
                    return Ok(format!("no friend at index {friend}"));
                };
                let liked = match usize::try_from(post) {
                    Ok(i) => self.directory.like_post(&me, &owner, i).await?,
                    Err(_) => false,
                };
                Ok(if liked {
                    format!("liked {owner}'s post {post}")
                } else {
                    format!("{owner} has no post at index {post}")
                })
            }
            Command::Logout => {
                self.session = None;
                Ok(format!("{me} logged out"))
            }
        }
    }

    async fn register(&mut self, user: &str, password: String) -> Result<String, SocialError> {
        let username = Username::try_new(user)?;
        self.directory.register(username.clone()).await?;
        self.credentials.push(UserRecord::new(username.clone(), password));
        Ok(self.persisted(format!("{username} registered")))
    }

    async fn login(&mut self, user: &str, password: &str) -> Result<String, SocialError> {
        let matches = self
            .credentials
            .iter()
            .any(|record| record.username.as_str() == user && record.password == password);
        if !matches {
            return Ok("invalid username or password".to_string());
        }
        let username = Username(user.to_string());
        let pending = self.directory.view(&username, |v| v.pending_requests().to_vec()).await?;
        self.session = Some(username.clone());
        Ok(format!(
            "logged in as {username}\n{}",
            render_names("pending friend requests", &pending)
        ))
    }

    async fn delete(&mut self, username: &Username) -> Result<String, SocialError> {
        self.directory.delete_user(username).await?;
        self.credentials.retain(|record| &record.username != username);
        if self.session.as_ref() == Some(username) {
            self.session = None;
        }
        Ok(self.persisted(format!("{username} removed")))
    }

    /// Saves after a registration or deletion. A failed save is reported but
    /// does not undo the change.
    fn persisted(&self, message: String) -> String {
        match self.save() {
            Ok(()) => message,
            Err(error) => {
                warn!(error = %format!("{error:#}"), "unable to save users");
                format!("{message} (unable to save users: {error})")
            }
        }
    }
}

fn render_names(title: &str, names: &[Username]) -> String {
    if names.is_empty() {
        return format!("no {title}");
    }
    let lines: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(index, name)| format!("  [{index}] {name}"))
        .collect();
    format!("{title}:\n{}", lines.join("\n"))
}

fn render_posts(posts: &[Post]) -> String {
    if posts.is_empty() {
        return "no posts".to_string();
    }
    posts
        .iter()
        .enumerate()
        .map(|(index, post)| format!("  [{index}] {} (likes: {})", post.text, post.likes))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_store::MemoryStore;

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    async fn run(shell: &mut Shell<MemoryStore>, lines: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        for line in lines {
            out.push(text(shell.handle(line).await));
        }
        out
    }

    fn shell() -> (Shell<MemoryStore>, MemoryStore) {
        let store = MemoryStore::default();
        (Shell::new(store.clone(), Vec::new()), store)
    }

    #[test]
    fn parse_commands() {
        assert_eq!(
            Command::parse("register alice pw"),
            Ok(Command::Register { user: "alice".into(), password: "pw".into() })
        );
        assert_eq!(
            Command::parse("post  hello   world "),
            Ok(Command::Post("hello   world".into()))
        );
        assert_eq!(Command::parse("like-own 3"), Ok(Command::LikeOwn(3)));
        assert!(Command::parse("like-own").is_err());
        assert_eq!(Command::parse("delete-post -1"), Ok(Command::DeletePost(-1)));
        assert_eq!(Command::parse("like 0 2"), Ok(Command::Like { friend: 0, post: 2 }));
        assert!(Command::parse("login alice").is_err());
        assert!(Command::parse("like x 1").is_err());
        assert!(Command::parse("dance").is_err());
    }

    #[tokio::test]
    async fn friend_scenario() -> anyhow::Result<()> {
        let (mut shell, store) = shell();
        run(&mut shell, &["register alice a", "register bob b"]).await;
        assert_eq!(store.load_all()?.len(), 2);

        run(&mut shell, &["login alice a", "send bob", "post hi", "logout"]).await;
        let out = run(
            &mut shell,
            &["login bob b", "accept alice", "friends", "like 0 0", "like 0 9"],
        )
        .await;
        assert!(out[0].contains("[0] alice"));
        assert_eq!(out[2], "friends:\n  [0] alice");
        assert_eq!(out[3], "liked alice's post 0");
        assert_eq!(out[4], "alice has no post at index 9");

        let out = run(&mut shell, &["feed"]).await;
        assert_eq!(out[0], "--- alice's posts ---\n  [0] hi (likes: 1)");
        Ok(())
    }

    #[tokio::test]
    async fn commands_need_a_session() {
        let (mut shell, _) = shell();
        assert_eq!(run(&mut shell, &["friends"]).await, vec!["log in first"]);
        run(&mut shell, &["register alice a"]).await;
        assert_eq!(
            run(&mut shell, &["login alice wrong"]).await,
            vec!["invalid username or password"]
        );
        assert_eq!(shell.prompt(), "> ");
    }

    #[tokio::test]
    async fn bad_post_indices_are_harmless() {
        let (mut shell, _) = shell();
        run(&mut shell, &["register alice a", "login alice a", "post one"]).await;
        let out = run(&mut shell, &["delete-post -1", "delete-post 1", "posts"]).await;
        assert_eq!(out[0], "no post at index -1");
        assert_eq!(out[1], "no post at index 1");
        assert_eq!(out[2], "  [0] one (likes: 0)");
    }

    #[tokio::test]
    async fn owner_likes_own_posts() {
        let (mut shell, _) = shell();
        run(&mut shell, &["register bob b", "login bob b", "post mine"]).await;
        let out = run(
            &mut shell,
            &["like-own 0", "like-own 1", "like-own -1", "like 0 0", "posts"],
        )
        .await;
        assert_eq!(out[0], "liked your post 0");
        assert_eq!(out[1], "no post at index 1");
        assert_eq!(out[2], "no post at index -1");
        // the friend path never resolves to yourself
        assert_eq!(out[3], "no friend at index 0");
        assert_eq!(out[4], "  [0] mine (likes: 1)");
    }

    #[tokio::test]
    async fn sent_lists_outgoing_requests() {
        let (mut shell, _) = shell();
        run(&mut shell, &["register alice a", "register bob b", "login alice a"]).await;
        let out = run(&mut shell, &["sent", "send bob", "sent"]).await;
        assert_eq!(out[0], "no sent friend requests");
        assert_eq!(out[2], "sent friend requests:\n  [0] bob");
    }

    #[tokio::test]
    async fn deleting_the_current_user_logs_out() -> anyhow::Result<()> {
        let (mut shell, store) = shell();
        run(&mut shell, &["register alice a", "register bob b", "login alice a", "send bob"]).await;
        let out = run(&mut shell, &["delete alice", "requests"]).await;
        assert_eq!(out[0], "alice removed");
        assert_eq!(out[1], "log in first");
        assert_eq!(
            store.load_all()?,
            vec![UserRecord::new(Username("bob".into()), "b")]
        );

        let out = run(&mut shell, &["login bob b", "delete ghost"]).await;
        assert!(out[0].ends_with("no pending friend requests"));
        assert_eq!(out[1], "user ghost not found");
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_and_invalid_registrations() {
        let (mut shell, _) = shell();
        let out = run(&mut shell, &["register alice a", "register alice b"]).await;
        assert_eq!(out[1], "user alice is already registered");
        assert!(matches!(shell.handle("quit").await, Reply::Quit));
    }
}
