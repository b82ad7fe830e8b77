//! Access control evaluator: pure predicates over `(actor, resume)`.
//!
//! Rules live in one per-role table instead of `if role == admin` branches
//! scattered through the handlers, so a new role only touches this module.

use uuid::Uuid;

use crate::models::resume::Resume;
use crate::models::share_link::ShareLink;
use crate::models::user::{Role, User};

type ResumeRule = fn(&User, &Resume) -> bool;

struct RolePolicy {
    view: ResumeRule,
    edit: ResumeRule,
    assign: ResumeRule,
    share: ResumeRule,
}

fn allow(_actor: &User, _resume: &Resume) -> bool {
    true
}

fn deny(_actor: &User, _resume: &Resume) -> bool {
    false
}

fn is_assignee(actor: &User, resume: &Resume) -> bool {
    resume.assigned_to == Some(actor.id)
}

fn is_assignee_or_uploader(actor: &User, resume: &Resume) -> bool {
    is_assignee(actor, resume) || resume.uploaded_by == actor.id
}

static ADMIN_POLICY: RolePolicy = RolePolicy {
    view: allow,
    edit: allow,
    assign: allow,
    share: allow,
};

static RECRUITER_POLICY: RolePolicy = RolePolicy {
    view: is_assignee_or_uploader,
    // Uploading does not grant edit rights once the resume is assigned elsewhere.
    edit: is_assignee,
    assign: deny,
    share: is_assignee_or_uploader,
};

fn policy_for(role: Role) -> &'static RolePolicy {
    match role {
        Role::Admin => &ADMIN_POLICY,
        Role::Recruiter => &RECRUITER_POLICY,
    }
}

pub fn can_view(actor: &User, resume: &Resume) -> bool {
    (policy_for(actor.role).view)(actor, resume)
}

pub fn can_edit(actor: &User, resume: &Resume) -> bool {
    (policy_for(actor.role).edit)(actor, resume)
}

pub fn can_assign(actor: &User, resume: &Resume) -> bool {
    (policy_for(actor.role).assign)(actor, resume)
}

pub fn can_share(actor: &User, resume: &Resume) -> bool {
    (policy_for(actor.role).share)(actor, resume)
}

/// Revocation is open to the link creator even after they have lost share
/// rights on the resume itself.
pub fn can_revoke_share(actor: &User, link: &ShareLink, resume: &Resume) -> bool {
    actor.role.is_admin() || link.created_by == actor.id || can_share(actor, resume)
}

/// Scope applied when listing resumes. Admins see everything; a recruiter
/// sees resumes assigned to them plus their own still-unassigned uploads.
/// Once someone else is assigned, the uploader's list visibility is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    Recruiter(Uuid),
}

pub fn list_scope(actor: &User) -> ListScope {
    match actor.role {
        Role::Admin => ListScope::All,
        Role::Recruiter => ListScope::Recruiter(actor.id),
    }
}

/// In-process equivalent of the SQL predicate built from [`ListScope`].
/// The in-memory store uses this directly.
pub fn scope_matches(scope: ListScope, resume: &Resume) -> bool {
    match scope {
        ListScope::All => true,
        ListScope::Recruiter(id) => {
            resume.assigned_to == Some(id)
                || (resume.uploaded_by == id && resume.assigned_to.is_none())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ResumeStatus;
    use chrono::Utc;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: "u".into(),
            full_name: None,
            phone: None,
            role,
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    fn resume(uploaded_by: Uuid, assigned_to: Option<Uuid>) -> Resume {
        Resume {
            id: Uuid::new_v4(),
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: None,
            skills: vec!["rust".into()],
            notes: None,
            file_key: "resumes/x.pdf".into(),
            file_name: "x.pdf".into(),
            file_size: 1,
            mime_type: "application/pdf".into(),
            status: ResumeStatus::New,
            uploaded_by,
            assigned_to,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn admin_has_every_capability() {
        let admin = user(Role::Admin);
        let r = resume(Uuid::new_v4(), Some(Uuid::new_v4()));
        assert!(can_view(&admin, &r));
        assert!(can_edit(&admin, &r));
        assert!(can_assign(&admin, &r));
        assert!(can_share(&admin, &r));
    }

    #[test]
    fn uploader_without_assignment_can_view_and_share_but_not_edit() {
        let recruiter = user(Role::Recruiter);
        let r = resume(recruiter.id, None);
        assert!(can_view(&recruiter, &r));
        assert!(!can_edit(&recruiter, &r));
        assert!(can_share(&recruiter, &r));
        assert!(!can_assign(&recruiter, &r));
    }

    #[test]
    fn assignee_can_edit() {
        let recruiter = user(Role::Recruiter);
        let r = resume(Uuid::new_v4(), Some(recruiter.id));
        assert!(can_view(&recruiter, &r));
        assert!(can_edit(&recruiter, &r));
        assert!(can_share(&recruiter, &r));
    }

    #[test]
    fn uploader_loses_edit_once_assigned_elsewhere() {
        let uploader = user(Role::Recruiter);
        let other = Uuid::new_v4();
        let r = resume(uploader.id, Some(other));
        assert!(!can_edit(&uploader, &r));
        // Still a viewer/sharer through uploader status on direct access.
        assert!(can_view(&uploader, &r));
        assert!(can_share(&uploader, &r));
        // Admin edit is unaffected.
        assert!(can_edit(&user(Role::Admin), &r));
    }

    #[test]
    fn unrelated_recruiter_is_denied_everything() {
        let stranger = user(Role::Recruiter);
        let r = resume(Uuid::new_v4(), Some(Uuid::new_v4()));
        assert!(!can_view(&stranger, &r));
        assert!(!can_edit(&stranger, &r));
        assert!(!can_share(&stranger, &r));
    }

    #[test]
    fn edit_implies_view_for_all_role_and_ownership_combinations() {
        let actors = [user(Role::Admin), user(Role::Recruiter)];
        for actor in &actors {
            let uploads = [actor.id, Uuid::new_v4()];
            let assignments = [None, Some(actor.id), Some(Uuid::new_v4())];
            for up in uploads {
                for assign in assignments {
                    let r = resume(up, assign);
                    if can_edit(actor, &r) {
                        assert!(can_view(actor, &r), "edit granted without view");
                    }
                }
            }
        }
    }

    #[test]
    fn creator_can_revoke_even_without_share_rights() {
        let creator = user(Role::Recruiter);
        // Resume now belongs to somebody else entirely.
        let r = resume(Uuid::new_v4(), Some(Uuid::new_v4()));
        let link = ShareLink {
            id: Uuid::new_v4(),
            token: "t".into(),
            resume_id: r.id,
            created_by: creator.id,
            expires_at: Utc::now(),
            revoked: false,
            created_at: Utc::now(),
        };
        assert!(!can_share(&creator, &r));
        assert!(can_revoke_share(&creator, &link, &r));

        let stranger = user(Role::Recruiter);
        assert!(!can_revoke_share(&stranger, &link, &r));
        assert!(can_revoke_share(&user(Role::Admin), &link, &r));
    }

    #[test]
    fn recruiter_list_scope_drops_uploads_assigned_elsewhere() {
        let recruiter = user(Role::Recruiter);
        let scope = list_scope(&recruiter);

        let own_unassigned = resume(recruiter.id, None);
        let own_self_assigned = resume(recruiter.id, Some(recruiter.id));
        let own_assigned_away = resume(recruiter.id, Some(Uuid::new_v4()));
        let assigned_in = resume(Uuid::new_v4(), Some(recruiter.id));
        let unrelated = resume(Uuid::new_v4(), None);

        assert!(scope_matches(scope, &own_unassigned));
        assert!(scope_matches(scope, &own_self_assigned));
        assert!(!scope_matches(scope, &own_assigned_away));
        assert!(scope_matches(scope, &assigned_in));
        assert!(!scope_matches(scope, &unrelated));
    }

    #[test]
    fn admin_list_scope_is_unrestricted() {
        let scope = list_scope(&user(Role::Admin));
        assert!(scope_matches(scope, &resume(Uuid::new_v4(), None)));
    }
}
