use crate::api::DynAPI;
use crate::entities::{Coordinates, FareQuote, RoutePair};
use crate::error::Error;

/// Fare quotes for the pickup/dropoff pair currently selected.
///
/// Call [`update`](FareEstimator::update) whenever either endpoint may have
/// changed. A remote estimate is requested once both endpoints are known and
/// the pair differs from the one behind the last successful quote. A failed
/// estimate keeps the previous quote on display and records the error.
pub struct FareEstimator {
    api: DynAPI,
    quote: Option<(RoutePair, FareQuote)>,
    error: Option<Error>,
}

impl FareEstimator {
    pub fn new(api: DynAPI) -> Self {
        Self {
            api,
            quote: None,
            error: None,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(
        &mut self,
        pickup: Option<Coordinates>,
        dropoff: Option<Coordinates>,
    ) -> Result<Option<FareQuote>, Error> {
        let pair = match RoutePair::from_options(pickup, dropoff) {
            Some(pair) => pair,
            None => return Ok(None),
        };

        if let Some(quote) = self.quote_for(pair) {
            tracing::debug!("pair unchanged, reusing quote");
            return Ok(Some(quote.clone()));
        }

        match self.api.estimate_fare(pair.pickup, pair.dropoff).await {
            Ok(quote) => {
                tracing::info!("estimated fare {:.2}", quote.estimated_fare);

                self.quote = Some((pair, quote.clone()));
                self.error = None;

                Ok(Some(quote))
            }
            Err(err) => {
                tracing::warn!("fare estimate failed: {}", err);

                self.error = Some(err.clone());

                Err(err)
            }
        }
    }

    /// The quote for exactly this pair, if one was obtained.
    pub fn quote_for(&self, pair: RoutePair) -> Option<&FareQuote> {
        match &self.quote {
            Some((quoted, quote)) if *quoted == pair => Some(quote),
            _ => None,
        }
    }

    /// Last successful quote whatever pair it was for, paired with that pair.
    pub fn last_quote(&self) -> Option<(&RoutePair, &FareQuote)> {
        self.quote.as_ref().map(|(pair, quote)| (pair, quote))
    }

    pub fn is_stale_for(&self, pickup: Option<Coordinates>, dropoff: Option<Coordinates>) -> bool {
        match RoutePair::from_options(pickup, dropoff) {
            Some(pair) => self.quote_for(pair).is_none(),
            None => true,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }
}
