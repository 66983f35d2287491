// UI module exports
// Plain-text renderers for the timeline and itinerary projections

pub mod text;
