//! Eight-ball rules: shot bookkeeping, judging and turn transitions.

use crate::types::*;

/// Everything that happened during one shot, from release until all balls
/// are at rest. Created by `TurnState::begin_shot` and consumed exactly once
/// by `TurnState::settle`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotRecord {
    pub shooter: Player,
    /// Shooter's group when the shot was released. Judging uses the group
    /// after assignment, so this is `None` on the assigning shot.
    pub group_at_start: Option<Group>,
    /// Shooter had already cleared their group when the shot was released
    pub on_the_eight: bool,
    /// Pot tags in the order the balls dropped
    pub pots: Vec<BallKind>,
    pub first_contact: Option<FirstContact>,
}

impl ShotRecord {
    pub fn new(shooter: Player, group_at_start: Option<Group>, on_the_eight: bool) -> Self {
        ShotRecord {
            shooter,
            group_at_start,
            on_the_eight,
            pots: Vec::new(),
            first_contact: None,
        }
    }

    /// Fold one physics tick into the record. Only the first cue-ball
    /// contact of the whole shot is kept.
    pub fn record(&mut self, report: &StepReport) {
        self.pots.extend(report.pots.iter().map(|pot| pot.kind));
        if self.first_contact.is_none() {
            self.first_contact = report.first_contact;
        }
    }

    pub fn potted(&self, kind: BallKind) -> bool {
        self.pots.contains(&kind)
    }

    pub fn count(&self, kind: BallKind) -> usize {
        self.pots.iter().filter(|&&k| k == kind).count()
    }
}

/// Decision produced by judging a settled shot
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Judgement {
    pub shooter: Player,
    /// Group given to player one by this shot (table was open)
    pub assigned: Option<Group>,
    pub outcome: ShotOutcome,
    pub switch_turn: bool,
    /// Incoming player gets ball in hand
    pub ball_in_hand: bool,
}

impl Judgement {
    fn resolved(shooter: Player, assigned: Option<Group>, outcome: ShotOutcome) -> Self {
        Judgement {
            shooter,
            assigned,
            outcome,
            switch_turn: false,
            ball_in_hand: false,
        }
    }

    fn foul(shooter: Player, assigned: Option<Group>, foul: Foul) -> Self {
        Judgement {
            shooter,
            assigned,
            outcome: ShotOutcome::Foul(foul),
            switch_turn: true,
            ball_in_hand: true,
        }
    }

    /// Winner, if this shot ended the match
    pub fn winner(&self) -> Option<Player> {
        match self.outcome {
            ShotOutcome::Win(player) => Some(player),
            ShotOutcome::Loss { player, .. } => Some(player.opposite()),
            ShotOutcome::None | ShotOutcome::Foul(_) => None,
        }
    }
}

/// Group held by `player` given player one's group
pub fn group_for(p1_group: Option<Group>, player: Player) -> Option<Group> {
    p1_group.map(|group| match player {
        Player::One => group,
        Player::Two => group.complement(),
    })
}

/// True iff `group` is assigned, the eight ball is gone and every ball of
/// `group` is gone.
pub fn check_win_condition(balls: &[Ball], group: Option<Group>) -> bool {
    let Some(group) = group else {
        return false;
    };

    let eight_gone = balls.iter().filter(|b| b.is_eight()).all(|b| !b.alive);
    eight_gone && balls.iter().filter(|b| b.belongs_to(group)).all(|b| !b.alive)
}

/// Whether every ball of `group` has left the table
pub fn group_cleared(balls: &[Ball], group: Group) -> bool {
    balls.iter().filter(|b| b.belongs_to(group)).all(|b| !b.alive)
}

/// Judge a settled shot. `p1_group` is player one's group before the shot.
///
/// Order: group assignment, scratch (scratch with the eight loses), eight
/// ball (win or early loss), then first-contact foul and turn keeping.
pub fn judge_shot(
    shot: &ShotRecord,
    balls: &[Ball],
    p1_group: Option<Group>,
    rules: RuleSet,
) -> Judgement {
    let shooter = shot.shooter;
    let scratched = shot.potted(BallKind::Cue);
    let eight = shot.potted(BallKind::Eight);
    let solids = shot.count(BallKind::Solid);
    let stripes = shot.count(BallKind::Stripe);

    let mut assigned = None;
    if p1_group.is_none() && !scratched && !eight {
        let shooter_group = match (solids > 0, stripes > 0) {
            (true, false) => Some(Group::Solids),
            (false, true) => Some(Group::Stripes),
            _ => None,
        };
        // Convert the shooter's group to player one's
        assigned = shooter_group.and_then(|g| group_for(Some(g), shooter));
    }

    let group = group_for(p1_group.or(assigned), shooter);

    if scratched {
        if eight {
            return Judgement::resolved(
                shooter,
                assigned,
                ShotOutcome::Loss {
                    player: shooter,
                    reason: LossReason::ScratchOnEightBall,
                },
            );
        }
        return Judgement::foul(shooter, assigned, Foul::Scratch);
    }

    if eight {
        let outcome = if check_win_condition(balls, group) {
            ShotOutcome::Win(shooter)
        } else {
            ShotOutcome::Loss {
                player: shooter,
                reason: LossReason::EarlyEightBall,
            }
        };
        return Judgement::resolved(shooter, assigned, outcome);
    }

    if rules == RuleSet::Strict {
        if let Some(foul) = first_contact_foul(shot, group) {
            return Judgement::foul(shooter, assigned, foul);
        }
    }

    let kept = match group {
        Some(g) => shot.count(g.ball_kind()) > 0,
        None => solids + stripes > 0,
    };

    Judgement {
        shooter,
        assigned,
        outcome: ShotOutcome::None,
        switch_turn: !kept,
        ball_in_hand: false,
    }
}

/// First-contact foul against the shooter's group, including a group this
/// shot just assigned. A table that is still open has no first-contact
/// requirement.
fn first_contact_foul(shot: &ShotRecord, group: Option<Group>) -> Option<Foul> {
    let group = group?;
    let required = if shot.on_the_eight {
        BallKind::Eight
    } else {
        group.ball_kind()
    };

    match shot.first_contact {
        None => Some(Foul::NoContact),
        Some(contact) if contact.kind != required => {
            Some(Foul::WrongFirstContact { hit: contact.kind })
        }
        Some(_) => None,
    }
}

/// Turn and match bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct TurnState {
    pub player_turn: Player,
    /// Player one's group; player two holds the complement
    pub p1_group: Option<Group>,
    pub cue_ball_in_hand: bool,
    pub last_outcome: ShotOutcome,
    /// Object balls pocketed by each player
    pub scores: [u8; 2],
    shot: Option<ShotRecord>,
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new(Player::One)
    }
}

impl TurnState {
    pub fn new(first: Player) -> Self {
        TurnState {
            player_turn: first,
            p1_group: None,
            cue_ball_in_hand: false,
            last_outcome: ShotOutcome::None,
            scores: [0, 0],
            shot: None,
        }
    }

    pub fn group_of(&self, player: Player) -> Option<Group> {
        group_for(self.p1_group, player)
    }

    pub fn shot_in_progress(&self) -> bool {
        self.shot.is_some()
    }

    pub fn current_shot(&self) -> Option<&ShotRecord> {
        self.shot.as_ref()
    }

    /// Start a fresh accumulator for the player to move
    pub fn begin_shot(&mut self, balls: &[Ball]) {
        let shooter = self.player_turn;
        let group = self.group_of(shooter);
        let on_the_eight = group.is_some_and(|group| group_cleared(balls, group));

        self.shot = Some(ShotRecord::new(shooter, group, on_the_eight));
    }

    /// Fold one tick into the shot in progress
    pub fn record(&mut self, report: &StepReport) {
        let Some(shot) = self.shot.as_mut() else {
            return;
        };

        let credited = report
            .pots
            .iter()
            .filter(|pot| pot.kind.group().is_some())
            .count();
        let score = &mut self.scores[shot.shooter.index()];
        *score = score.saturating_add(credited as u8);

        shot.record(report);
    }

    /// Consume the shot in progress, judge it and apply the decision.
    /// `None` when no shot was in progress.
    pub fn settle(&mut self, balls: &[Ball], rules: RuleSet) -> Option<Judgement> {
        let shot = self.shot.take()?;
        let judgement = judge_shot(&shot, balls, self.p1_group, rules);
        self.apply(&judgement);

        log::info!(
            "Shot by {} judged: {:?} (switch turn: {})",
            judgement.shooter,
            judgement.outcome,
            judgement.switch_turn
        );
        Some(judgement)
    }

    fn apply(&mut self, judgement: &Judgement) {
        if self.p1_group.is_none() {
            self.p1_group = judgement.assigned;
        }
        self.last_outcome = judgement.outcome;
        if judgement.ball_in_hand {
            self.cue_ball_in_hand = true;
        }
        if judgement.switch_turn {
            self.player_turn = self.player_turn.opposite();
        }
    }
}
