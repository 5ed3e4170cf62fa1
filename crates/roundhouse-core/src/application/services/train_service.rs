//! Train Service - building consists.

use tracing::{debug, info, instrument};

use crate::{
    application::ports::TrainRepository,
    domain::{
        Allocation, DomainError, DomainValidator as validator, SparseIndex, Train, TrainId,
        TrainMember, TrainMemberId,
    },
    error::RoundhouseResult,
};

/// Train and member use cases.
pub struct TrainService {
    trains: Box<dyn TrainRepository>,
    ordering: SparseIndex,
}

impl TrainService {
    pub fn new(trains: Box<dyn TrainRepository>) -> Self {
        Self {
            trains,
            ordering: SparseIndex::default(),
        }
    }

    /// Use `ordering` for member keys.
    pub fn with_ordering(mut self, ordering: SparseIndex) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn get(&self, id: TrainId) -> RoundhouseResult<Train> {
        self.trains.get(id)
    }

    /// All trains, by name.
    pub fn list(&self) -> RoundhouseResult<Vec<Train>> {
        let mut trains = self.trains.list()?;
        trains.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(trains)
    }

    /// Create an empty train.
    #[instrument(skip(self))]
    pub fn create(&self, name: &str, number: Option<&str>) -> RoundhouseResult<Train> {
        let mut train = Train::new(name.trim());
        if let Some(number) = number {
            train.number = number.trim().to_string();
        }
        validator::validate_train(&train)?;

        self.trains.save(train.clone())?;
        info!(id = %train.id, "Train created");
        Ok(train)
    }

    #[instrument(skip(self))]
    pub fn rename(&self, id: TrainId, name: &str) -> RoundhouseResult<Train> {
        let mut train = self.trains.get(id)?;
        train.name = name.trim().to_string();
        validator::validate_train(&train)?;

        self.trains.save(train.clone())?;
        info!("Train renamed");
        Ok(train)
    }

    #[instrument(skip(self))]
    pub fn remove(&self, id: TrainId) -> RoundhouseResult<()> {
        self.trains.remove(id)?;
        info!("Train removed");
        Ok(())
    }

    /// Add `member` at the end of the train.
    #[instrument(skip(self, member), fields(member = %member.number_or_name))]
    pub fn append_member(&self, train_id: TrainId, member: TrainMember) -> RoundhouseResult<TrainMember> {
        let mut train = self.trains.get(train_id)?;
        let member_id = member.id;

        let allocation = self.ordering.push(&mut train.members, member);
        self.commit(train, member_id, allocation)
    }

    /// Add `member` at zero-based position `at`.
    #[instrument(skip(self, member), fields(member = %member.number_or_name))]
    pub fn insert_member(
        &self,
        train_id: TrainId,
        member: TrainMember,
        at: usize,
    ) -> RoundhouseResult<TrainMember> {
        let mut train = self.trains.get(train_id)?;
        let member_id = member.id;

        let allocation = self.ordering.insert(&mut train.members, member, at)?;
        self.commit(train, member_id, allocation)
    }

    /// Move a member to zero-based position `to`.
    #[instrument(skip(self))]
    pub fn move_member(
        &self,
        train_id: TrainId,
        member_id: TrainMemberId,
        to: usize,
    ) -> RoundhouseResult<TrainMember> {
        let mut train = self.trains.get(train_id)?;
        let from = position_of(&train, member_id)?;

        let allocation = self.ordering.move_item(&mut train.members, from, to)?;
        self.commit(train, member_id, allocation)
    }

    #[instrument(skip(self))]
    pub fn remove_member(
        &self,
        train_id: TrainId,
        member_id: TrainMemberId,
    ) -> RoundhouseResult<TrainMember> {
        let mut train = self.trains.get(train_id)?;
        let position = position_of(&train, member_id)?;

        let removed = train.members.remove(position);
        self.trains.save(train)?;
        info!("Member removed");
        Ok(removed)
    }

    /// Turn a member round. Its position is unchanged.
    #[instrument(skip(self))]
    pub fn flip_member(
        &self,
        train_id: TrainId,
        member_id: TrainMemberId,
    ) -> RoundhouseResult<TrainMember> {
        let mut train = self.trains.get(train_id)?;
        let position = position_of(&train, member_id)?;

        let member = &mut train.members[position];
        member.is_flipped = !member.is_flipped;
        let flipped = member.clone();

        self.trains.save(train)?;
        debug!(is_flipped = flipped.is_flipped, "Member flipped");
        Ok(flipped)
    }

    fn commit(
        &self,
        train: Train,
        member_id: TrainMemberId,
        allocation: Allocation,
    ) -> RoundhouseResult<TrainMember> {
        if allocation.renumbered {
            info!(
                train = %train.id,
                members = train.members.len(),
                "No gap left between members, renumbered"
            );
        }
        validator::validate_train(&train)?;

        let position = position_of(&train, member_id)?;
        let member = train.members[position].clone();
        self.trains.save(train)?;
        debug!(index = member.index, position, "Member placed");
        Ok(member)
    }
}

fn position_of(train: &Train, member_id: TrainMemberId) -> Result<usize, DomainError> {
    train
        .position_of_member(member_id)
        .ok_or_else(|| DomainError::ChildNotFound {
            entity: "train member",
            id: member_id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockTrainRepository;
    use crate::error::RoundhouseError;
    use mockall::predicate::*;

    fn stored(train: &Train) -> MockTrainRepository {
        let mut repo = MockTrainRepository::new();
        let copy = train.clone();
        repo.expect_get()
            .with(eq(train.id))
            .returning(move |_| Ok(copy.clone()));
        repo
    }

    fn consist(keys: &[i64]) -> Train {
        let mut train = Train::new("Night Riviera");
        for (n, key) in keys.iter().enumerate() {
            let mut member = TrainMember::new("Mk3", format!("{}", 10_000 + n));
            member.index = *key;
            train.members.push(member);
        }
        train
    }

    #[test]
    fn create_rejects_blank_name() {
        let mut repo = MockTrainRepository::new();
        repo.expect_save().never();

        let service = TrainService::new(Box::new(repo));
        let err = service.create("   ", None).unwrap_err();
        assert!(matches!(
            err,
            RoundhouseError::Domain(DomainError::MissingRequiredField { .. })
        ));
    }

    #[test]
    fn create_trims_and_saves() {
        let mut repo = MockTrainRepository::new();
        repo.expect_save()
            .withf(|t| t.name == "Cornish Riviera" && t.number == "1A79")
            .times(1)
            .returning(|_| Ok(()));

        let service = TrainService::new(Box::new(repo));
        let train = service
            .create(" Cornish Riviera ", Some("1A79"))
            .unwrap();
        assert_eq!(train.title(), "1A79 Cornish Riviera");
    }

    #[test]
    fn first_member_gets_baseline() {
        let train = consist(&[]);
        let mut repo = stored(&train);
        repo.expect_save().times(1).returning(|_| Ok(()));

        let service = TrainService::new(Box::new(repo));
        let member = service
            .append_member(train.id, TrainMember::new("Class 57", "57 602"))
            .unwrap();
        assert_eq!(member.index, 64);
    }

    #[test]
    fn insert_at_front_halves_first_key() {
        let train = consist(&[64, 128]);
        let mut repo = stored(&train);
        repo.expect_save().times(1).returning(|_| Ok(()));

        let service = TrainService::new(Box::new(repo));
        let member = service
            .insert_member(train.id, TrainMember::new("Class 57", "57 602"), 0)
            .unwrap();
        assert_eq!(member.index, 32);
    }

    #[test]
    fn move_to_end_appends_after_last_remaining() {
        let train = consist(&[64, 128, 192]);
        let moving = train.members[0].id;
        let mut repo = stored(&train);
        repo.expect_save()
            .withf(move |t| t.members.last().map(|m| m.id) == Some(moving))
            .times(1)
            .returning(|_| Ok(()));

        let service = TrainService::new(Box::new(repo));
        let member = service.move_member(train.id, moving, 2).unwrap();
        assert_eq!(member.index, 256);
    }

    #[test]
    fn move_out_of_range_is_rejected() {
        let train = consist(&[64, 128]);
        let moving = train.members[0].id;
        let mut repo = stored(&train);
        repo.expect_save().never();

        let service = TrainService::new(Box::new(repo));
        assert!(service.move_member(train.id, moving, 2).is_err());
    }

    #[test]
    fn flip_toggles_and_keeps_position() {
        let train = consist(&[64, 128]);
        let target = train.members[1].id;
        let mut repo = stored(&train);
        repo.expect_save()
            .withf(move |t| t.members[1].id == target && t.members[1].is_flipped)
            .times(1)
            .returning(|_| Ok(()));

        let service = TrainService::new(Box::new(repo));
        let member = service.flip_member(train.id, target).unwrap();
        assert!(member.is_flipped);
        assert_eq!(member.index, 128);
    }

    #[test]
    fn remove_unknown_member_is_not_found() {
        let train = consist(&[64]);
        let repo = stored(&train);

        let service = TrainService::new(Box::new(repo));
        let err = service
            .remove_member(train.id, TrainMemberId::new())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
