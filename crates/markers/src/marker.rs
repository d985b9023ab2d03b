use foundation::easing::{Easing, lerp};
use foundation::handles::Handle;
use foundation::math::LngLat;
use foundation::time::{Time, TimeSpan};
use pins::CityKey;
use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub Handle);

impl std::fmt::Display for MarkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "marker#{}", self.0)
    }
}

/// Everything the map needs to draw one marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerVisual {
    pub position: LngLat,
    pub scale: f64,
    pub opacity: f64,
    pub label: String,
    pub country_code: Option<String>,
    pub count: u32,
    /// Always `false`: kiosk markers never receive pointer events.
    pub interactive: bool,
}

/// Scale/opacity transition (entrance or exit).
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Fade {
    pub span: TimeSpan,
    pub easing: Easing,
    pub from: (f64, f64),
    pub to: (f64, f64),
}

impl Fade {
    pub fn sample(&self, now: Time) -> (f64, f64) {
        let t = self.easing.apply(self.span.progress(now));
        (lerp(self.from.0, self.to.0, t), lerp(self.from.1, self.to.1, t))
    }
}

/// Position transition between two representative coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Glide {
    pub span: TimeSpan,
    pub easing: Easing,
    pub from: LngLat,
    pub to: LngLat,
}

impl Glide {
    pub fn sample(&self, now: Time) -> LngLat {
        self.from.lerp(self.to, self.easing.apply(self.span.progress(now)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Marker {
    pub id: MarkerId,
    pub key: CityKey,
    pub visual: MarkerVisual,
    /// Where the marker is heading; equals `visual.position` when at rest.
    pub target: LngLat,
    pub entrance: Option<Fade>,
    pub glide: Option<Glide>,
    pub exit: Option<Fade>,
}

impl Marker {
    pub fn is_exiting(&self) -> bool {
        self.exit.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.entrance.is_some() || self.glide.is_some() || self.exit.is_some()
    }
}

/// Generational slot storage for markers.
#[derive(Debug, Default)]
pub(crate) struct MarkerSlots {
    slots: Vec<Option<Marker>>,
    generations: Vec<u32>,
    free: Vec<u32>,
}

impl MarkerSlots {
    pub fn allocate(&mut self) -> MarkerId {
        match self.free.pop() {
            Some(index) => {
                let generation = self.generations[index as usize];
                MarkerId(Handle::new(index, generation))
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(None);
                self.generations.push(0);
                MarkerId(Handle::new(index, 0))
            }
        }
    }

    pub fn insert(&mut self, marker: Marker) {
        let idx = marker.id.0.index() as usize;
        if let Some(slot) = self.slots.get_mut(idx) {
            *slot = Some(marker);
        }
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        let idx = id.0.index() as usize;
        if self.generations.get(idx) != Some(&id.0.generation()) {
            return None;
        }
        self.slots.get(idx).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, id: MarkerId) -> Option<&mut Marker> {
        let idx = id.0.index() as usize;
        if self.generations.get(idx) != Some(&id.0.generation()) {
            return None;
        }
        self.slots.get_mut(idx).and_then(|s| s.as_mut())
    }

    pub fn remove(&mut self, id: MarkerId) -> Option<Marker> {
        let idx = id.0.index() as usize;
        if self.generations.get(idx) != Some(&id.0.generation()) {
            return None;
        }
        let marker = self.slots.get_mut(idx)?.take()?;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free.push(idx as u32);
        Some(marker)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }

    pub fn ids(&self) -> Vec<MarkerId> {
        self.iter().map(|m| m.id).collect()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }
}
