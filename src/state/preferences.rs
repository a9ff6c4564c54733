//! Display preferences stored as plain strings.

// self
use crate::{
	_prelude::*,
	obs,
	store::{KeyValueStore, StoreError},
};

/// Storage key of the theme.
pub const THEME_KEY: &str = "theme";
/// Storage key of the locale.
pub const LOCALE_KEY: &str = "locale";

/// Color scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
	/// Light scheme.
	#[default]
	Light,
	/// Dark scheme.
	Dark,
}
impl Theme {
	/// Returns the stored label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Theme::Light => "light",
			Theme::Dark => "dark",
		}
	}

	/// Returns the other scheme.
	pub const fn toggled(self) -> Self {
		match self {
			Theme::Light => Theme::Dark,
			Theme::Dark => Theme::Light,
		}
	}
}
impl FromStr for Theme {
	type Err = UnknownPreference;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"light" => Ok(Theme::Light),
			"dark" => Ok(Theme::Dark),
			_ => Err(UnknownPreference { key: THEME_KEY, value: s.to_owned() }),
		}
	}
}
impl Display for Theme {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Interface language.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Locale {
	/// Uzbek.
	#[default]
	Uz,
	/// Russian.
	Ru,
	/// English.
	En,
}
impl Locale {
	/// Language used for strings missing from the active locale.
	pub const FALLBACK: Locale = Locale::En;

	/// Returns the stored label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Locale::Uz => "uz",
			Locale::Ru => "ru",
			Locale::En => "en",
		}
	}
}
impl FromStr for Locale {
	type Err = UnknownPreference;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"uz" => Ok(Locale::Uz),
			"ru" => Ok(Locale::Ru),
			"en" => Ok(Locale::En),
			_ => Err(UnknownPreference { key: LOCALE_KEY, value: s.to_owned() }),
		}
	}
}
impl Display for Locale {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// A stored preference holds an unrecognized value.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Preference `{key}` has unknown value `{value}`.")]
pub struct UnknownPreference {
	/// Storage key.
	pub key: &'static str,
	/// Rejected value.
	pub value: String,
}

/// Theme and locale, read from and written to storage on every call.
#[derive(Clone)]
pub struct Preferences {
	storage: Arc<dyn KeyValueStore>,
}
impl Preferences {
	/// Wraps `storage`.
	pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
		Self { storage }
	}

	/// Stored theme; missing or unknown values read as [`Theme::Light`].
	pub fn theme(&self) -> Theme {
		self.read(THEME_KEY)
	}

	/// Stores `theme`.
	pub fn set_theme(&self, theme: Theme) -> Result<(), StoreError> {
		self.storage.set(THEME_KEY, theme.as_str().to_owned())
	}

	/// Flips the theme and returns the new value.
	pub fn toggle_theme(&self) -> Result<Theme, StoreError> {
		let theme = self.theme().toggled();

		self.set_theme(theme)?;

		Ok(theme)
	}

	/// Stored locale; missing or unknown values read as [`Locale::Uz`].
	pub fn locale(&self) -> Locale {
		self.read(LOCALE_KEY)
	}

	/// Stores `locale`.
	pub fn set_locale(&self, locale: Locale) -> Result<(), StoreError> {
		self.storage.set(LOCALE_KEY, locale.as_str().to_owned())
	}

	fn read<T>(&self, key: &'static str) -> T
	where
		T: Default + FromStr<Err = UnknownPreference>,
	{
		match self.storage.get(key) {
			Ok(Some(raw)) => raw.parse().unwrap_or_else(|e: UnknownPreference| {
				obs::log_storage_issue("preferences.read", &e);

				T::default()
			}),
			Ok(None) => T::default(),
			Err(e) => {
				obs::log_storage_issue("preferences.read", &e);

				T::default()
			},
		}
	}
}
impl Debug for Preferences {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Preferences")
			.field("theme", &self.theme())
			.field("locale", &self.locale())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::MemoryStore;

	#[test]
	fn defaults_apply_until_something_is_stored() {
		let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
		let preferences = Preferences::new(storage.clone());

		assert_eq!(preferences.theme(), Theme::Light);
		assert_eq!(preferences.locale(), Locale::Uz);

		storage.set(LOCALE_KEY, "de".into()).expect("Raw writes should succeed.");

		assert_eq!(preferences.locale(), Locale::Uz);

		preferences.set_locale(Locale::Ru).expect("Locale should persist.");

		assert_eq!(storage.get(LOCALE_KEY).expect("Read should succeed."), Some("ru".into()));
		assert_eq!(preferences.locale(), Locale::Ru);
	}

	#[test]
	fn theme_toggles_between_schemes() {
		let preferences = Preferences::new(Arc::new(MemoryStore::default()));

		assert_eq!(preferences.toggle_theme().expect("Toggle should persist."), Theme::Dark);
		assert_eq!(preferences.theme(), Theme::Dark);
		assert_eq!(preferences.toggle_theme().expect("Toggle should persist."), Theme::Light);
	}
}
