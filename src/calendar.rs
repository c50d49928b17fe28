//! Arithmétique de dates : projection « jour civil » dans un fuseau de
//! référence, jour suivant/précédent, énumération de plages.
//!
//! Les instants sont stockés en UTC ; seules les comparaisons « même jour »
//! passent par le fuseau de référence.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

/// Fuseau de référence (décalage fixe) pour les comparaisons au jour près.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarZone {
    offset: FixedOffset,
}

impl Default for CalendarZone {
    fn default() -> Self {
        Self::utc()
    }
}

impl CalendarZone {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// `None` si le décalage dépasse ±24h.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(|offset| Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Jour civil de `instant` dans le fuseau de référence.
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    pub fn same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        self.date_of(a) == self.date_of(b)
    }

    /// Instant UTC correspondant à `date` + `time` dans le fuseau de référence.
    pub fn start_of(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let local = date.and_time(time);
        // un décalage fixe n'a ni trou ni ambiguïté
        let fixed = self
            .offset
            .from_local_datetime(&local)
            .single()
            .unwrap_or_else(|| self.offset.from_utc_datetime(&local));
        fixed.with_timezone(&Utc)
    }
}

pub fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.succ_opt()
}

pub fn previous_day(date: NaiveDate) -> Option<NaiveDate> {
    date.pred_opt()
}

/// `count` jours consécutifs à partir de `start` (inclus). S'arrête au bord
/// du calendrier.
pub fn days(start: NaiveDate, count: u32) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take(count as usize)
}

/// Ajoute `hours` heures à un instant ; `None` au-delà des bornes de chrono.
pub fn plus_hours(instant: DateTime<Utc>, hours: u32) -> Option<DateTime<Utc>> {
    instant.checked_add_signed(Duration::hours(i64::from(hours)))
}

/// Source de temps pour les horodatages (`created_at`, `reviewed_at`...).
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Horloge figée, pour des tests reproductibles.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
