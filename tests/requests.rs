#![forbid(unsafe_code)]
mod common;

use chrono::NaiveDate;
use common::{clock, draft, fixture, july, Fixture};
use garde::{
    AssignmentId, Decision, ErrorKind, FixedClock, InMemoryAssignments, InMemoryRequests,
    RequestDraft, RequestId, RequestKind, RequestPatch, RequestReviewInput, RequestStatus,
    ReviewDesk, Scheduler, SchedulerOptions, StaffId,
};

fn july_date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
}

fn leave(day: u32) -> RequestDraft {
    RequestDraft {
        kind: RequestKind::Leave,
        start_date: july_date(day),
        end_date: july_date(day + 2),
        reason: Some("Family vacation".into()),
        swap_shift: None,
        swap_with: None,
    }
}

fn swap(shift: &AssignmentId, with: Option<&StaffId>) -> RequestDraft {
    RequestDraft {
        kind: RequestKind::Swap,
        start_date: july_date(12),
        end_date: july_date(12),
        reason: None,
        swap_shift: Some(shift.clone()),
        swap_with: with.cloned(),
    }
}

fn decide(id: &RequestId, decision: Decision, notes: Option<&str>) -> RequestReviewInput {
    RequestReviewInput {
        request: id.clone(),
        decision,
        notes: notes.map(str::to_string),
    }
}

/// alice de garde le 12 ; bob de garde le 11.
fn seeded(fx: &Fixture) -> (InMemoryAssignments, AssignmentId) {
    let mut repo = InMemoryAssignments::new();
    let mut s = Scheduler::new(&mut repo, &fx.directory, SchedulerOptions::default())
        .with_clock(clock());
    let alice12 = s
        .create_assignment(&fx.admin, draft(&fx.cardio_room, &fx.alice, 12))
        .unwrap();
    s.create_assignment(&fx.admin, draft(&fx.cardio_room, &fx.bob, 11))
        .unwrap();
    drop(s);
    (repo, alice12.id)
}

#[test]
fn leave_request_is_reviewed_once() {
    let fx = fixture();
    let mut repo = InMemoryAssignments::new();
    let scheduler = Scheduler::new(&mut repo, &fx.directory, SchedulerOptions::default());
    let mut store = InMemoryRequests::new();
    let mut desk = ReviewDesk::new(&mut store).with_clock(clock());

    let request = desk.submit(&fx.alice, leave(10)).unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert!(request.reviewed_by.is_none());

    let mut desk = desk.with_clock(FixedClock(july(2, 10)));
    let approved = desk
        .review(
            &fx.admin,
            decide(&request.id, Decision::Approve, Some("enjoy")),
            &scheduler,
        )
        .unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.reviewed_by.as_ref(), Some(&fx.admin));
    assert_eq!(approved.reviewed_at, Some(july(2, 10)));
    assert_eq!(approved.review_notes.as_deref(), Some("enjoy"));

    let err = desk
        .review(&fx.bob, decide(&request.id, Decision::Reject, Some("no")), &scheduler)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert_eq!(err.to_string(), "invalid transition: approved -> rejected");
    drop(desk);

    let stored = store.as_slice()[0].clone();
    assert_eq!(stored, approved);
}

#[test]
fn withdraw_is_reserved_to_the_requester_and_final() {
    let fx = fixture();
    let mut repo = InMemoryAssignments::new();
    let scheduler = Scheduler::new(&mut repo, &fx.directory, SchedulerOptions::default());
    let mut store = InMemoryRequests::new();
    let mut desk = ReviewDesk::new(&mut store).with_clock(clock());

    let request = desk.submit(&fx.alice, leave(20)).unwrap();
    let err = desk.withdraw(&fx.bob, &request.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);

    let withdrawn = desk.withdraw(&fx.alice, &request.id).unwrap();
    assert_eq!(withdrawn.status, RequestStatus::Cancelled);
    assert!(withdrawn.reviewed_by.is_none());

    let err = desk
        .review(&fx.admin, decide(&request.id, Decision::Approve, None), &scheduler)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert_eq!(
        desk.withdraw(&fx.alice, &request.id).unwrap_err().kind(),
        ErrorKind::InvalidTransition
    );
}

#[test]
fn malformed_requests_are_refused() {
    let fx = fixture();
    let mut store = InMemoryRequests::new();
    let mut desk = ReviewDesk::new(&mut store).with_clock(clock());

    let mut backwards = leave(10);
    backwards.end_date = july_date(9);
    assert_eq!(
        desk.submit(&fx.alice, backwards).unwrap_err().kind(),
        ErrorKind::ValidationFailed
    );

    let mut no_shift = swap(&AssignmentId::new("x"), Some(&fx.bob));
    no_shift.swap_shift = None;
    assert_eq!(
        desk.submit(&fx.alice, no_shift).unwrap_err().kind(),
        ErrorKind::ValidationFailed
    );

    let to_self = swap(&AssignmentId::new("x"), Some(&fx.alice));
    assert_eq!(
        desk.submit(&fx.alice, to_self).unwrap_err().kind(),
        ErrorKind::ValidationFailed
    );

    let single_day = RequestDraft {
        kind: RequestKind::Preference,
        start_date: july_date(19),
        end_date: july_date(19),
        reason: Some("Prefer not to work on Saturdays".into()),
        swap_shift: None,
        swap_with: None,
    };
    desk.submit(&fx.carol, single_day).unwrap();
    assert_eq!(desk.pending().unwrap().len(), 1);
}

#[test]
fn swap_approval_fails_when_receiver_would_miss_rest_day() {
    let fx = fixture();
    let (mut repo, alice12) = seeded(&fx);
    let scheduler = Scheduler::new(&mut repo, &fx.directory, SchedulerOptions::default());
    let mut store = InMemoryRequests::new();
    let mut desk = ReviewDesk::new(&mut store).with_clock(clock());

    let request = desk.submit(&fx.alice, swap(&alice12, Some(&fx.bob))).unwrap();
    let err = desk
        .review(&fx.admin, decide(&request.id, Decision::Approve, None), &scheduler)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRestDay);

    // la demande reste en attente et peut encore être rejetée
    assert_eq!(desk.pending().unwrap().len(), 1);
    let rejected = desk
        .review(&fx.admin, decide(&request.id, Decision::Reject, None), &scheduler)
        .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
}

#[test]
fn swap_approval_validates_but_does_not_move_the_shift() {
    let fx = fixture();
    let (mut repo, alice12) = seeded(&fx);
    let scheduler = Scheduler::new(&mut repo, &fx.directory, SchedulerOptions::default());
    let mut store = InMemoryRequests::new();
    let mut desk = ReviewDesk::new(&mut store).with_clock(clock());

    let to_carol = desk.submit(&fx.alice, swap(&alice12, Some(&fx.carol))).unwrap();
    let approved = desk
        .review(&fx.admin, decide(&to_carol.id, Decision::Approve, None), &scheduler)
        .unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);

    let volunteers = desk.submit(&fx.alice, swap(&alice12, None)).unwrap();
    desk.review(&fx.admin, decide(&volunteers.id, Decision::Approve, None), &scheduler)
        .unwrap();

    let shift = scheduler
        .assignments()
        .unwrap()
        .into_iter()
        .find(|a| a.id == alice12)
        .unwrap();
    assert_eq!(shift.staff, fx.alice);
    assert_eq!(desk.for_staff(&fx.alice).unwrap().len(), 2);
}

#[test]
fn swap_of_someone_elses_or_missing_shift_is_refused() {
    let fx = fixture();
    let (mut repo, alice12) = seeded(&fx);
    let scheduler = Scheduler::new(&mut repo, &fx.directory, SchedulerOptions::default());
    let mut store = InMemoryRequests::new();
    let mut desk = ReviewDesk::new(&mut store).with_clock(clock());

    let not_theirs = desk.submit(&fx.carol, swap(&alice12, Some(&fx.bob))).unwrap();
    assert_eq!(
        desk.review(&fx.admin, decide(&not_theirs.id, Decision::Approve, None), &scheduler)
            .unwrap_err()
            .kind(),
        ErrorKind::ValidationFailed
    );

    let missing = desk
        .submit(&fx.alice, swap(&AssignmentId::new("gone"), Some(&fx.carol)))
        .unwrap();
    assert_eq!(
        desk.review(&fx.admin, decide(&missing.id, Decision::Approve, None), &scheduler)
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );

    assert_eq!(
        desk.review(
            &fx.admin,
            decide(&RequestId::new("nope"), Decision::Reject, None),
            &scheduler
        )
        .unwrap_err()
        .kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn pending_request_can_be_amended_by_its_requester() {
    let fx = fixture();
    let mut store = InMemoryRequests::new();
    let mut desk = ReviewDesk::new(&mut store).with_clock(clock());
    let request = desk.submit(&fx.alice, leave(10)).unwrap();

    let mut desk = desk.with_clock(FixedClock(july(3, 12)));
    let amended = desk
        .amend(
            &fx.alice,
            &request.id,
            RequestPatch {
                end_date: Some(july_date(14)),
                reason: Some("Longer trip".into()),
                ..RequestPatch::default()
            },
        )
        .unwrap();
    assert_eq!(amended.start_date, july_date(10));
    assert_eq!(amended.end_date, july_date(14));
    assert_eq!(amended.reason.as_deref(), Some("Longer trip"));
    assert_eq!(amended.status, RequestStatus::Pending);
    assert_eq!(amended.created_at, request.created_at);
    assert_eq!(amended.updated_at, july(3, 12));
    assert!(amended.reviewed_by.is_none());
    assert!(amended.reviewed_at.is_none());
    assert!(amended.review_notes.is_none());

    let err = desk
        .amend(&fx.bob, &request.id, RequestPatch::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
}

#[test]
fn amendments_are_validated_like_submissions() {
    let fx = fixture();
    let mut store = InMemoryRequests::new();
    let mut desk = ReviewDesk::new(&mut store).with_clock(clock());
    let request = desk
        .submit(&fx.alice, swap(&AssignmentId::new("x"), Some(&fx.bob)))
        .unwrap();

    let backwards = RequestPatch {
        end_date: Some(july_date(11)),
        ..RequestPatch::default()
    };
    assert_eq!(
        desk.amend(&fx.alice, &request.id, backwards).unwrap_err().kind(),
        ErrorKind::ValidationFailed
    );

    let to_self = RequestPatch {
        swap_with: Some(fx.alice.clone()),
        ..RequestPatch::default()
    };
    assert_eq!(
        desk.amend(&fx.alice, &request.id, to_self).unwrap_err().kind(),
        ErrorKind::ValidationFailed
    );

    // rien n'a été écrit par les tentatives refusées
    drop(desk);
    assert_eq!(store.as_slice()[0], request);
}

#[test]
fn reviewed_requests_can_no_longer_be_amended_or_deleted() {
    let fx = fixture();
    let mut repo = InMemoryAssignments::new();
    let scheduler = Scheduler::new(&mut repo, &fx.directory, SchedulerOptions::default());
    let mut store = InMemoryRequests::new();
    let mut desk = ReviewDesk::new(&mut store).with_clock(clock());

    let request = desk.submit(&fx.alice, leave(10)).unwrap();
    desk.review(&fx.admin, decide(&request.id, Decision::Reject, None), &scheduler)
        .unwrap();

    let err = desk
        .amend(&fx.alice, &request.id, RequestPatch::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);

    let err = desk.delete(&fx.alice, &request.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert_eq!(desk.for_staff(&fx.alice).unwrap().len(), 1);
}

#[test]
fn requester_deletes_pending_or_withdrawn_requests() {
    let fx = fixture();
    let mut store = InMemoryRequests::new();
    let mut desk = ReviewDesk::new(&mut store).with_clock(clock());

    let pending = desk.submit(&fx.alice, leave(10)).unwrap();
    let withdrawn = desk.submit(&fx.alice, leave(20)).unwrap();
    desk.withdraw(&fx.alice, &withdrawn.id).unwrap();

    let err = desk.delete(&fx.bob, &pending.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);

    let removed = desk.delete(&fx.alice, &pending.id).unwrap();
    assert_eq!(removed.id, pending.id);
    desk.delete(&fx.alice, &withdrawn.id).unwrap();
    assert!(desk.for_staff(&fx.alice).unwrap().is_empty());

    assert_eq!(
        desk.delete(&fx.alice, &pending.id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}
