//! Per-role visibility of discussions, comments and reviews.
//!
//! Admins see everything. Everyone else sees the records they created, and a
//! comment's visibility is decided on its own: a student sees their comments
//! even under discussions started by somebody else.

use campus_types::models::{Comment, CourseDiscussion, Discussion, Identity, Professor, Review};

use crate::dates::normalize_field;

/// Split discussions into the ones `identity` may see and the comments it may see.
///
/// `created_at` is normalized on discussions and comments alike.
pub fn filter_discussions(
    mut discussions: Vec<Discussion>,
    identity: &Identity,
) -> (Vec<Discussion>, Vec<Comment>) {
    let admin = identity.is_admin();
    for discussion in &mut discussions {
        normalize_field(&mut discussion.created_at);
        for comment in &mut discussion.comments {
            normalize_field(&mut comment.created_at);
        }
    }

    let comments = discussions
        .iter()
        .flat_map(|discussion| {
            discussion
                .comments
                .iter()
                .filter(move |c| admin || identity.owns(c.creator_id))
                .map(move |c| with_parent(c, discussion.id))
        })
        .collect();

    let discussions = if admin {
        discussions
    } else {
        discussions
            .into_iter()
            .filter(|d| identity.owns(d.creator_id))
            .collect()
    };

    (discussions, comments)
}

fn with_parent(comment: &Comment, discussion_id: i64) -> Comment {
    let mut comment = comment.clone();
    comment.discussion_id.get_or_insert(discussion_id);
    comment
}

/// Course flavour of [`filter_discussions`].
///
/// Visible comments are stamped with their course, and `created_at` is
/// normalized on discussions and comments alike.
pub fn filter_course_discussions(
    discussions: Vec<CourseDiscussion>,
    identity: &Identity,
) -> (Vec<CourseDiscussion>, Vec<Comment>) {
    let admin = identity.is_admin();
    let mut visible = Vec::new();
    let mut comments = Vec::new();

    for mut discussion in discussions {
        normalize_field(&mut discussion.created_at);
        for comment in &mut discussion.comments {
            normalize_field(&mut comment.created_at);
        }

        for comment in &discussion.comments {
            if admin || identity.owns(comment.creator_id) {
                let mut comment = with_parent(comment, discussion.id);
                comment.course_subject = Some(discussion.course_subject.clone());
                comment.course_id = Some(discussion.course_id.clone());
                comments.push(comment);
            }
        }

        if admin || identity.owns(discussion.creator_id) {
            visible.push(discussion);
        }
    }

    (visible, comments)
}

/// Reviews `identity` may see, flattened out of every professor.
///
/// The ownership check runs before anything else touches the review, so a
/// foreign review is dropped however malformed it is.
pub fn filter_reviews(professors: &[Professor], identity: &Identity) -> Vec<Review> {
    let admin = identity.is_admin();
    professors
        .iter()
        .flat_map(|professor| {
            professor
                .reviews
                .iter()
                .filter(move |r| admin || identity.owns(r.creator_id))
                .map(move |review| {
                    let mut review = review.clone();
                    review.professor_name = Some(professor.name.clone());
                    review.professor_id = Some(professor.id);
                    normalize_field(&mut review.created_at);
                    review
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_types::models::{DateValue, Role};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn student(user_id: i64) -> Identity {
        Identity {
            user_id: Some(user_id),
            email: Some("student@example.com".into()),
            role: Role::Student,
            access_token: Some("tok".into()),
        }
    }

    fn admin() -> Identity {
        Identity {
            role: Role::Admin,
            ..student(1)
        }
    }

    fn discussions() -> Vec<Discussion> {
        serde_json::from_value(json!([
            {
                "id": 1, "title": "Mine", "creator_id": 10,
                "comments": [{ "id": 11, "creator_id": 999, "body": "theirs" }]
            },
            {
                "id": 2, "title": "Theirs", "creator_id": 999,
                "comments": [{ "id": 21, "creator_id": 10, "body": "mine" }]
            }
        ]))
        .unwrap()
    }

    #[test]
    fn student_sees_own_discussions_and_own_comments_anywhere() {
        let (discussions, comments) = filter_discussions(discussions(), &student(10));

        assert_eq!(discussions.len(), 1);
        assert_eq!(discussions[0].id, 1);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, Some(21));
        assert_eq!(comments[0].discussion_id, Some(2));
    }

    #[test]
    fn admin_sees_everything() {
        let (discussions, comments) = filter_discussions(discussions(), &admin());
        assert_eq!(discussions.len(), 2);
        assert_eq!(comments.len(), 2);
    }

    #[test]
    fn discussion_and_comment_dates_are_normalized() {
        let raw: Vec<Discussion> = serde_json::from_value(json!([{
            "id": 1, "creator_id": 10, "created_at": "2024-01-02T03:04:00Z",
            "comments": [{ "id": 11, "creator_id": 10, "created_at": "not a date" }]
        }]))
        .unwrap();

        let (discussions, comments) = filter_discussions(raw, &student(10));
        assert_eq!(
            discussions[0].created_at,
            Some(DateValue::Parsed(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 0).unwrap()))
        );
        assert_eq!(comments[0].created_at, Some(DateValue::Raw("not a date".into())));
    }

    #[test]
    fn staff_without_matches_sees_nothing() {
        let staff = Identity {
            role: Role::Staff,
            ..student(5)
        };
        let (discussions, comments) = filter_discussions(discussions(), &staff);
        assert!(discussions.is_empty());
        assert!(comments.is_empty());
    }

    #[test]
    fn course_comments_are_stamped_and_dated() {
        let raw: Vec<CourseDiscussion> = serde_json::from_value(json!([{
            "id": 3,
            "course_subject": "CSCI",
            "course_id": 520,
            "creator_id": 999,
            "created_at": "bad date",
            "comments": [
                { "creator_id": 10, "created_at": "2024-01-02T03:04:00Z" },
                { "creator_id": 999, "created_at": "2024-01-02T03:04:00Z" }
            ]
        }]))
        .unwrap();

        let (discussions, comments) = filter_course_discussions(raw, &student(10));

        assert!(discussions.is_empty());
        assert_eq!(comments.len(), 1);
        let comment = &comments[0];
        assert_eq!(comment.course_subject.as_deref(), Some("CSCI"));
        assert_eq!(comment.course_id.as_deref(), Some("520"));
        assert_eq!(comment.discussion_id, Some(3));
        assert_eq!(
            comment.created_at,
            Some(DateValue::Parsed(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 0).unwrap()))
        );
    }

    #[test]
    fn admin_course_discussions_keep_unparsable_dates() {
        let raw: Vec<CourseDiscussion> = serde_json::from_value(json!([{
            "id": 3, "course_subject": "CSCI", "course_id": "520", "created_at": "bad date"
        }]))
        .unwrap();

        let (discussions, _) = filter_course_discussions(raw, &admin());
        assert_eq!(discussions[0].created_at, Some(DateValue::Raw("bad date".into())));
    }

    fn professors() -> Vec<Professor> {
        serde_json::from_value(json!([{
            "id": 7,
            "name": "Prof. X",
            "department": "CS",
            "reviews": [
                { "creator_id": 10, "created_at": "2024-03-01T00:00:00Z", "content": "Great" },
                { "creator_id": 999, "content": "no date at all" },
                { "creator_id": 10, "created_at": "yesterday", "content": "Odd date" }
            ]
        }]))
        .unwrap()
    }

    #[test]
    fn reviews_are_filtered_before_any_date_handling() {
        let reviews = filter_reviews(&professors(), &student(10));

        assert_eq!(reviews.len(), 2);
        assert!(reviews.iter().all(|r| r.creator_id == Some(10)));
        assert_eq!(reviews[0].professor_name.as_deref(), Some("Prof. X"));
        assert_eq!(reviews[0].professor_id, Some(7));
        assert!(reviews[0].created_at.as_ref().and_then(DateValue::parsed).is_some());
        assert_eq!(reviews[1].created_at, Some(DateValue::Raw("yesterday".into())));
    }

    #[test]
    fn admin_sees_reviews_without_dates() {
        let reviews = filter_reviews(&professors(), &admin());
        assert_eq!(reviews.len(), 3);
        assert_eq!(reviews[1].created_at, None);
    }
}
