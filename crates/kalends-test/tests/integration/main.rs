mod calendar_edit;
mod rrule_integration;
mod scheduling;
mod settings;
mod validation;
